pub mod proto {
    pub use hickory_proto::*;
}

pub mod resolver {
    pub use hickory_resolver::*;
}

pub mod server {
    pub use hickory_server::*;
}
