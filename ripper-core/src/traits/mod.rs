pub mod disc_device;
pub mod rip_controller;
pub mod status_sink;
pub mod upload_transport;
