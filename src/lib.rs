// Crate entry point. Re-export modules so tests and the binary can import
// them easily.
//
// Responsibilities
// - Only declare and expose modules. No business logic here.

pub mod config;

pub mod core {
    pub mod event;
    pub mod ports;
}

pub mod adapters {
    pub mod in_memory;
    pub mod mongo;
}

pub mod service {
    pub mod counts;
    pub mod events;
}

pub mod http {
    pub mod envelope;
    pub mod handlers;
    pub mod router;
    pub mod state;
}
