//! Outbound ports implemented by the infrastructure layer

pub mod payment_gateway;

pub use payment_gateway::{ChargeRequest, PaymentError, PaymentGateway};
