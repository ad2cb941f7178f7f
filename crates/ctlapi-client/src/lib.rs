pub mod client;
pub mod completion;
pub mod decoder;
pub mod error;
pub mod request;
pub mod resolver;
pub mod scheduler;
pub mod transport;
pub mod url_builder;

// Re-export commonly used types
pub use client::ApiClient;
pub use completion::{Completion, PollOptions, PollSession};
pub use decoder::{Dispatch, PollStatus};
pub use error::{ClientError, ClientResult, TransportError};
pub use scheduler::{Recurring, RecurringTask, TaskHandle, Tick};
pub use transport::{OutboundRequest, ReqwestTransport, Transport, TransportResponse};
pub use url_builder::UrlBuilder;

pub use ctlapi_config::ClientConfig;
pub use ctlapi_core::{Action, ApiAction, ApiResult, ErrorCode, ErrorKind, Parameters, RestInfo};
