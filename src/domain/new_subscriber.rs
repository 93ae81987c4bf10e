use serde::Serialize;

use super::ContactName;
use super::ListId;
use super::SubscriberEmail;

/// A contact ready to be pushed to a recipient list. Built once per form
/// submission; every field has already been parsed.
#[derive(Debug, Clone)]
pub struct NewSubscriber {
    pub list_id: ListId,
    pub email: SubscriberEmail,
    pub first_name: ContactName,
    pub last_name: ContactName,
    /// Ask Rapidmail to send its double opt-in mail
    pub send_confirmation: bool,
}

/// JSON body of `POST /recipients`
#[derive(Serialize)]
pub(crate) struct CreateRecipientRequest<'a> {
    recipientlist_id: &'a str,
    email: &'a str,
    firstname: &'a str,
    lastname: &'a str,
    send_activationmail: bool,
}

impl<'a> From<&'a NewSubscriber> for CreateRecipientRequest<'a> {
    fn from(sub: &'a NewSubscriber) -> Self {
        Self {
            recipientlist_id: sub.list_id.as_ref(),
            email: sub.email.as_ref(),
            firstname: sub.first_name.as_ref(),
            lastname: sub.last_name.as_ref(),
            send_activationmail: sub.send_confirmation,
        }
    }
}
