pub mod app;
pub mod config;

pub mod common {
    pub mod date;
    pub mod error;
    pub mod format;
    pub mod message;
    pub mod money;
}

pub mod domain {
    pub mod account;
    pub mod ledger;
    pub mod security;
    pub mod staged;
}

pub mod io {
    pub mod mapper;
    pub mod reader;
    pub mod writer;
}

pub mod worker {
    pub mod processor;
    pub mod reconciler;
    pub mod session;
    pub mod verifier;

    pub mod handlers {
        pub mod fidelity;
        pub mod yahoo;
    }
}
