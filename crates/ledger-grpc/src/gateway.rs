//! Gateway connection and the service-trait adapters.

use crate::convert;
use ledger_proto::pb;
use ledger_proto::pb::content_store_client::ContentStoreClient;
use ledger_proto::pb::ledger_client::LedgerClient;
use medledger_content::{ContentError, ContentResult, ContentStore, OutboundDocument};
use medledger_core::{
    CallError, CallResult, ClientConfig, ConsultationRecord, DoctorProfile, LedgerError,
    LedgerResult, LedgerService, PatientProfile,
};
use medledger_types::{Address, DocumentHandle, RequestId};
use tonic::metadata::{Ascii, MetadataValue};
use tonic::service::interceptor::InterceptedService;
use tonic::service::Interceptor;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Request, Status};

const CONTRACT_METADATA_KEY: &str = "x-contract-address";

/// Attaches the resolved contract address to every outgoing request.
///
/// The gateway is generic over deployments; which contract a call targets is
/// client-side knowledge, resolved once during [`connect`] and carried as
/// request metadata from then on.
#[derive(Clone)]
pub struct ContractBinding {
    contract: MetadataValue<Ascii>,
}

impl ContractBinding {
    fn new(contract: Address) -> Self {
        let contract = contract
            .to_string()
            .parse()
            .expect("canonical address is valid ASCII metadata");
        Self { contract }
    }
}

impl Interceptor for ContractBinding {
    fn call(&mut self, mut req: Request<()>) -> Result<Request<()>, Status> {
        req.metadata_mut()
            .insert(CONTRACT_METADATA_KEY, self.contract.clone());
        Ok(req)
    }
}

type GatewayChannel = InterceptedService<Channel, ContractBinding>;

/// Maps a gRPC status to the core call-error taxonomy.
fn call_error(status: Status) -> CallError {
    match status.code() {
        Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled => {
            CallError::Transport(status.message().to_owned())
        }
        _ => CallError::Rejected(status.message().to_owned()),
    }
}

fn content_error(status: Status) -> ContentError {
    match status.code() {
        Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled => {
            ContentError::Transport(status.message().to_owned())
        }
        _ => ContentError::Rejected(status.message().to_owned()),
    }
}

fn log_tx(operation: &'static str, res: &pb::TxRes) {
    tracing::debug!(operation, tx = %res.transaction_hash, "ledger write confirmed");
}

/// Dials the gateway and resolves the contract binding for its network.
///
/// # Errors
///
/// - [`LedgerError::Connection`] if the endpoint cannot be dialled or the
///   network handshake fails.
/// - [`LedgerError::ContractNotDeployed`] if the configured deployments table
///   has no contract for the gateway's network.
pub async fn connect(config: &ClientConfig) -> LedgerResult<(GrpcLedger, GrpcContentStore)> {
    let endpoint = Endpoint::from_shared(config.gateway_addr().to_owned())
        .map_err(|e| LedgerError::Connection(CallError::Transport(e.to_string())))?;
    let channel = endpoint
        .connect()
        .await
        .map_err(|e| LedgerError::Connection(CallError::Transport(e.to_string())))?;

    let mut probe = LedgerClient::new(channel.clone());
    let network = probe
        .get_network(pb::GetNetworkReq {})
        .await
        .map_err(|s| LedgerError::Connection(call_error(s)))?
        .into_inner();

    let contract = config.contract_address(network.network_id)?;
    tracing::info!(
        network_id = network.network_id,
        %contract,
        "connected to ledger gateway"
    );

    let binding = ContractBinding::new(contract);
    let ledger = GrpcLedger {
        client: LedgerClient::with_interceptor(channel.clone(), binding.clone()),
    };
    let store = GrpcContentStore {
        client: ContentStoreClient::with_interceptor(channel, binding),
    };
    Ok((ledger, store))
}

/// `LedgerService` over the generated tonic client.
#[derive(Clone)]
pub struct GrpcLedger {
    client: LedgerClient<GatewayChannel>,
}

impl LedgerService for GrpcLedger {
    async fn register_patient(&self, sender: Address, profile: &PatientProfile) -> CallResult<()> {
        let mut client = self.client.clone();
        let res = client
            .register_patient(convert::register_patient_req(sender, profile))
            .await
            .map_err(call_error)?;
        log_tx("register_patient", &res.into_inner());
        Ok(())
    }

    async fn register_doctor(&self, sender: Address, profile: &DoctorProfile) -> CallResult<()> {
        let mut client = self.client.clone();
        let res = client
            .register_doctor(convert::register_doctor_req(sender, profile))
            .await
            .map_err(call_error)?;
        log_tx("register_doctor", &res.into_inner());
        Ok(())
    }

    async fn patient(&self, party: Address) -> CallResult<Option<PatientProfile>> {
        let mut client = self.client.clone();
        let res = client
            .get_patient(pb::PartyReq {
                party: party.to_string(),
            })
            .await
            .map_err(call_error)?;
        Ok(convert::patient_from_res(res.into_inner()))
    }

    async fn doctor(&self, party: Address) -> CallResult<Option<DoctorProfile>> {
        let mut client = self.client.clone();
        let res = client
            .get_doctor(pb::PartyReq {
                party: party.to_string(),
            })
            .await
            .map_err(call_error)?;
        Ok(convert::doctor_from_res(res.into_inner()))
    }

    async fn doctor_details(&self, party: Address) -> CallResult<Option<DoctorProfile>> {
        let mut client = self.client.clone();
        let res = client
            .get_doctor_details(pb::PartyReq {
                party: party.to_string(),
            })
            .await
            .map_err(call_error)?;
        Ok(convert::doctor_from_res(res.into_inner()))
    }

    async fn registered_patients(&self) -> CallResult<Vec<Address>> {
        let mut client = self.client.clone();
        let res = client
            .list_registered_patients(pb::ListPartiesReq {})
            .await
            .map_err(call_error)?;
        Ok(convert::parties_from_res(res.into_inner()))
    }

    async fn registered_doctors(&self) -> CallResult<Vec<Address>> {
        let mut client = self.client.clone();
        let res = client
            .list_registered_doctors(pb::ListPartiesReq {})
            .await
            .map_err(call_error)?;
        Ok(convert::parties_from_res(res.into_inner()))
    }

    async fn request_consultation(&self, sender: Address, approver: Address) -> CallResult<()> {
        let mut client = self.client.clone();
        let res = client
            .request_consultation(pb::ConsultationReq {
                sender: sender.to_string(),
                counterparty: approver.to_string(),
            })
            .await
            .map_err(call_error)?;
        log_tx("request_consultation", &res.into_inner());
        Ok(())
    }

    async fn approve_consultation(&self, sender: Address, requester: Address) -> CallResult<()> {
        let mut client = self.client.clone();
        let res = client
            .approve_consultation(pb::ConsultationReq {
                sender: sender.to_string(),
                counterparty: requester.to_string(),
            })
            .await
            .map_err(call_error)?;
        log_tx("approve_consultation", &res.into_inner());
        Ok(())
    }

    async fn reject_consultation(&self, sender: Address, requester: Address) -> CallResult<()> {
        let mut client = self.client.clone();
        let res = client
            .reject_consultation(pb::ConsultationReq {
                sender: sender.to_string(),
                counterparty: requester.to_string(),
            })
            .await
            .map_err(call_error)?;
        log_tx("reject_consultation", &res.into_inner());
        Ok(())
    }

    async fn request(&self, id: RequestId) -> CallResult<ConsultationRecord> {
        let mut client = self.client.clone();
        let res = client
            .get_request(pb::GetRequestReq {
                request_id: id.to_hex(),
            })
            .await
            .map_err(call_error)?;
        Ok(convert::record_from_res(res.into_inner()))
    }

    async fn is_approved(&self, requester: Address, approver: Address) -> CallResult<bool> {
        let mut client = self.client.clone();
        let res = client
            .is_approved(pb::IsApprovedReq {
                requester: requester.to_string(),
                approver: approver.to_string(),
            })
            .await
            .map_err(call_error)?;
        Ok(res.into_inner().approved)
    }

    async fn send_prescription(
        &self,
        sender: Address,
        patient: Address,
        handle: &DocumentHandle,
    ) -> CallResult<()> {
        let mut client = self.client.clone();
        let res = client
            .send_prescription(pb::SendDocumentReq {
                sender: sender.to_string(),
                recipient: patient.to_string(),
                handle: handle.to_string(),
            })
            .await
            .map_err(call_error)?;
        log_tx("send_prescription", &res.into_inner());
        Ok(())
    }

    async fn send_report(
        &self,
        sender: Address,
        doctor: Address,
        handle: &DocumentHandle,
    ) -> CallResult<()> {
        let mut client = self.client.clone();
        let res = client
            .send_report(pb::SendDocumentReq {
                sender: sender.to_string(),
                recipient: doctor.to_string(),
                handle: handle.to_string(),
            })
            .await
            .map_err(call_error)?;
        log_tx("send_report", &res.into_inner());
        Ok(())
    }
}

/// `ContentStore` over the generated tonic client.
#[derive(Clone)]
pub struct GrpcContentStore {
    client: ContentStoreClient<GatewayChannel>,
}

impl ContentStore for GrpcContentStore {
    async fn upload(&self, document: &OutboundDocument) -> ContentResult<DocumentHandle> {
        let mut client = self.client.clone();
        let res = client
            .upload(pb::UploadReq {
                filename: document.filename().to_owned(),
                data: document.bytes().to_vec(),
            })
            .await
            .map_err(content_error)?;

        Ok(DocumentHandle::new(res.into_inner().handle)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_codes_map_to_transport_errors() {
        let error = call_error(Status::unavailable("gateway down"));
        assert!(matches!(error, CallError::Transport(_)));

        let error = call_error(Status::deadline_exceeded("too slow"));
        assert!(matches!(error, CallError::Transport(_)));
    }

    #[test]
    fn ledger_rejections_map_to_rejected_errors() {
        let error = call_error(Status::permission_denied("not the approver"));
        assert!(matches!(error, CallError::Rejected(_)));

        let error = call_error(Status::invalid_argument("bad address"));
        assert!(matches!(error, CallError::Rejected(_)));
    }

    #[test]
    fn upload_rejections_map_to_content_errors() {
        assert!(matches!(
            content_error(Status::unavailable("store down")),
            ContentError::Transport(_)
        ));
        assert!(matches!(
            content_error(Status::invalid_argument("file too large")),
            ContentError::Rejected(_)
        ));
    }

    #[test]
    fn binding_attaches_the_contract_header() {
        let contract = Address::from_bytes([0xcd; 20]);
        let mut binding = ContractBinding::new(contract);

        let req = binding.call(Request::new(())).unwrap();
        let value = req.metadata().get(CONTRACT_METADATA_KEY).unwrap();
        assert_eq!(value.to_str().unwrap(), contract.to_string());
    }
}
