pub mod connectivity;
pub mod data_access;
pub mod operation_queue;
pub mod seen_state;

pub use connectivity::ConnectivityMonitor;
pub use data_access::{AddOutcome, DataAccessFacade, DataSubscription, WriteOutcome};
pub use operation_queue::{OperationQueue, ReplayReport};
pub use seen_state::SeenStateService;
