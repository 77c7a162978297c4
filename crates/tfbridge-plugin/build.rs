//! Generates the gRPC client and server bindings for the bridge services.
//!
//! Message types are hand-written `prost` derives in `src/proto/mod.rs`, so
//! the services are described with the manual builder and no `protoc` run is
//! needed.

use tonic_build::manual::{Builder, Method, Service};

const PACKAGE: &str = "tfbridge.v1";
const CODEC: &str = "tonic::codec::ProstCodec";

#[derive(Clone, Copy)]
enum Streaming {
    Unary,
    Server,
    Bidirectional,
}

fn method(name: &str, route: &str, input: &str, output: &str, streaming: Streaming) -> Method {
    let unary = Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("crate::proto::{input}"))
        .output_type(format!("crate::proto::{output}"))
        .codec_path(CODEC);
    match streaming {
        Streaming::Unary => unary,
        Streaming::Server => unary.server_streaming(),
        Streaming::Bidirectional => unary.client_streaming().server_streaming(),
    }
    .build()
}

fn provider_service() -> Service {
    use Streaming::{Bidirectional, Unary};

    let methods = [
        method("stop", "Stop", "Empty", "Empty", Unary),
        method("get_schema", "GetSchema", "GetSchemaRequest", "GetSchemaResponse", Unary),
        method("input", "Input", "InputRequest", "InputResponse", Bidirectional),
        method("validate", "Validate", "ValidateRequest", "ValidateResponse", Unary),
        method(
            "validate_resource",
            "ValidateResource",
            "ValidateResourceRequest",
            "ValidateResponse",
            Unary,
        ),
        method("configure", "Configure", "ConfigureRequest", "Empty", Unary),
        method("apply", "Apply", "ApplyRequest", "ApplyResponse", Unary),
        method("diff", "Diff", "DiffRequest", "DiffResponse", Unary),
        method("refresh", "Refresh", "RefreshRequest", "RefreshResponse", Unary),
        method(
            "import_state",
            "ImportState",
            "ImportStateRequest",
            "ImportStateResponse",
            Unary,
        ),
        method("resources", "Resources", "Empty", "ResourcesResponse", Unary),
        method(
            "validate_data_source",
            "ValidateDataSource",
            "ValidateDataSourceRequest",
            "ValidateResponse",
            Unary,
        ),
        method(
            "read_data_diff",
            "ReadDataDiff",
            "ReadDataDiffRequest",
            "ReadDataDiffResponse",
            Unary,
        ),
        method(
            "read_data_apply",
            "ReadDataApply",
            "ReadDataApplyRequest",
            "ReadDataApplyResponse",
            Unary,
        ),
        method("data_sources", "DataSources", "Empty", "DataSourcesResponse", Unary),
    ];

    methods
        .into_iter()
        .fold(
            Service::builder().name("Provider").package(PACKAGE),
            |service, method| service.method(method),
        )
        .build()
}

fn provisioner_service() -> Service {
    use Streaming::{Server, Unary};

    Service::builder()
        .name("Provisioner")
        .package(PACKAGE)
        .method(method("validate", "Validate", "ValidateRequest", "ValidateResponse", Unary))
        .method(method("apply", "Apply", "ProvisionerApplyRequest", "UiOutput", Server))
        .method(method("stop", "Stop", "Empty", "Empty", Unary))
        .build()
}

fn main() {
    Builder::new().compile(&[provider_service(), provisioner_service()]);
}
