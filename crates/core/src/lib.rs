pub mod config;
pub mod engine;
pub mod testing;
pub mod ticket;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, DatabaseConfig, StoreBackend, StoreConfig,
};
pub use engine::{
    AgingBucket, AgingReport, CreateForm, MenuAction, Presenter, Report, TicketEngine,
    TicketError, UpdateForm,
};
pub use ticket::{
    InMemoryTicketStore, Responsible, SqliteTicketStore, State, StoreError, Ticket, TicketStore,
    TicketType,
};
