/// Identifier of a Rapidmail recipient list. The API hands out integers, but
/// the id is only ever echoed back, so it is kept as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListId(String);

impl ListId {
    pub fn parse(id: String) -> Result<Self, String> {
        let id = id.trim().to_string();
        match id.is_empty() {
            true => Err("No Rapidmail list selected".to_string()),
            false => Ok(Self(id)),
        }
    }
}

impl AsRef<str> for ListId {
    fn as_ref(&self) -> &str { &self.0 }
}
