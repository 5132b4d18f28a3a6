//! Search-and-selection state machine driving an account explorer against a
//! remote REST API.

pub mod events;
pub mod explorer;
pub mod gateway;
pub mod pagination;
pub mod preferences;
pub mod search;
pub mod selection;
pub mod state;

pub use events::ExplorerEvent;
pub use explorer::{Explorer, ExplorerCommand, ExplorerOptions, ExplorerSnapshot};
pub use gateway::{
    EntityGateway, GatewayConfig, HttpEntityGateway, SearchPage, HARD_CAP, SECONDARY_FETCH_CAP,
};
pub use pagination::{paginate, PageBounds};
pub use search::{PageState, SearchPhase};
pub use selection::{SelectionPhase, SelectionToken};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
