//! Domain layer: aggregate and command infrastructure, the billing account
//! aggregate and the travel booking request.

pub mod account;
pub mod aggregate;
pub mod command;
pub mod error;
pub mod travel;

pub use account::{
    Account, AccountError, AccountEvent, AccountService, CancelSubscriptionCommand,
    CreateInvoiceCommand, CreateSubscriptionCommand, DepositCommand, Invoice, InvoiceId,
    OpenAccountCommand, Subscription, SubscriptionId, SubscriptionStatus, WithdrawCommand,
};
pub use aggregate::{Aggregate, DomainEvent};
pub use command::{Command, CommandHandler, CommandResult};
pub use common::{CustomerId, Money};
pub use error::DomainError;
pub use travel::{BookTravelCommand, CarRentalRequest, FlightRequest, HotelStayRequest, TravelError};
