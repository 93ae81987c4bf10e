mod contact_name;
mod credentials;
mod list_id;
mod new_subscriber;
mod recipient_list;
mod subscriber_email;
// allow external `use` statements to skip `new_subscriber` etc
pub use contact_name::ContactName;
pub use credentials::Credentials;
pub use list_id::ListId;
pub(crate) use new_subscriber::CreateRecipientRequest;
pub use new_subscriber::NewSubscriber;
pub use recipient_list::RecipientList;
pub use recipient_list::RecipientLists;
pub use subscriber_email::SubscriberEmail;
