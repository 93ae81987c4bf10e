use serde::ser::SerializeMap;
use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use serde_aux::field_attributes::deserialize_string_from_number;

/// A named mailing list on the Rapidmail side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientList {
    // rapidmail returns integer ids; everything downstream treats them as
    // opaque strings
    #[serde(deserialize_with = "deserialize_string_from_number")]
    pub id: String,
    pub name: String,
}

/// id -> name mapping of recipient lists, in the order the API returned them.
///
/// Inserting an id that is already present overwrites its name but keeps its
/// position, so there is exactly one entry per id.
///
/// Serializes as a JSON object `{"<id>": "<name>"}`, which is what the host's
/// select field reads its options from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientLists(Vec<RecipientList>);

impl Serialize for RecipientLists {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for list in &self.0 {
            map.serialize_entry(&list.id, &list.name)?;
        }
        map.end()
    }
}

impl RecipientLists {
    pub fn insert(
        &mut self,
        list: RecipientList,
    ) {
        match self.0.iter_mut().find(|l| l.id == list.id) {
            Some(existing) => existing.name = list.name,
            None => self.0.push(list),
        }
    }

    pub fn get(
        &self,
        id: &str,
    ) -> Option<&str> {
        self.0
            .iter()
            .find(|l| l.id == id)
            .map(|l| l.name.as_str())
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &RecipientList> { self.0.iter() }
}

impl FromIterator<RecipientList> for RecipientLists {
    fn from_iter<I: IntoIterator<Item = RecipientList>>(iter: I) -> Self {
        let mut lists = Self::default();
        for list in iter {
            lists.insert(list);
        }
        lists
    }
}
