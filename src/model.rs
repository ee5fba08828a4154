use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(-?\d{1,4})(?:-|$)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    #[serde(other)]
    Unspecified,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
            Self::Unspecified => "unspecified",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentType {
    #[default]
    Biological,
    Adoptive,
    Step,
    Foster,
}

impl ParentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Biological => "biological",
            Self::Adoptive => "adoptive",
            Self::Step => "step",
            Self::Foster => "foster",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnionType {
    Marriage,
    Partnership,
    CivilUnion,
    Other,
}

impl UnionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Marriage => "marriage",
            Self::Partnership => "partnership",
            Self::CivilUnion => "civil_union",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnionStatus {
    #[default]
    Ongoing,
    Divorced,
    Annulled,
    Widowed,
    Separated,
}

impl UnionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Divorced => "divorced",
            Self::Annulled => "annulled",
            Self::Widowed => "widowed",
            Self::Separated => "separated",
        }
    }

    /// Divorce and annulment end a union; widowhood and separation do not.
    pub fn is_ended(self) -> bool {
        matches!(self, Self::Divorced | Self::Annulled)
    }
}

/// Top-left corner of a node box in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "PersonRow", into = "PersonRow")]
pub struct Person {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub maiden_name: Option<String>,
    pub gender: Gender,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub birth_place: Option<String>,
    pub death_place: Option<String>,
    pub occupation: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub current_address: Option<String>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub data: Option<String>,
    /// Present only once the user has placed the node by hand.
    pub position: Option<Position>,
}

impl Person {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn named(id: impl Into<String>, first: &str, last: &str) -> Self {
        Self {
            first_name: non_empty(first),
            last_name: non_empty(last),
            ..Self::new(id)
        }
    }

    pub fn full_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            "Unknown".to_string()
        } else {
            parts.join(" ")
        }
    }

    pub fn initials(&self) -> String {
        let first = initial(self.first_name.as_deref());
        let last = initial(self.last_name.as_deref());
        let initials: String = first.into_iter().chain(last).collect();
        if initials.is_empty() {
            "?".to_string()
        } else {
            initials.to_uppercase()
        }
    }

    pub fn is_deceased(&self) -> bool {
        self.death_date.is_some()
    }

    pub fn birth_year(&self) -> Option<i32> {
        self.birth_date.as_deref().and_then(year_of)
    }

    pub fn death_year(&self) -> Option<i32> {
        self.death_date.as_deref().and_then(year_of)
    }

    /// "1950 - 2010", "1950 - present", or nothing without a birth year.
    pub fn lifespan(&self) -> Option<String> {
        let birth = self.birth_year()?;
        Some(match self.death_year() {
            Some(death) => format!("{birth} - {death}"),
            None => format!("{birth} - present"),
        })
    }
}

fn initial(name: Option<&str>) -> Option<char> {
    name.and_then(|value| value.trim().chars().next())
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Extracts the year from an ISO `YYYY[-MM[-DD]]` date.
pub fn year_of(date: &str) -> Option<i32> {
    YEAR_RE
        .captures(date)
        .and_then(|caps| caps.get(1))
        .and_then(|year| year.as_str().parse().ok())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersonRow {
    id: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    maiden_name: Option<String>,
    #[serde(default)]
    birth_date: Option<String>,
    #[serde(default)]
    death_date: Option<String>,
    #[serde(default)]
    birth_place: Option<String>,
    #[serde(default)]
    death_place: Option<String>,
    #[serde(default)]
    gender: Option<Gender>,
    #[serde(default)]
    occupation: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    current_address: Option<String>,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    position_x: Option<f32>,
    #[serde(default)]
    position_y: Option<f32>,
}

impl From<PersonRow> for Person {
    fn from(row: PersonRow) -> Self {
        // A half-stored coordinate pair is not a placement.
        let position = match (row.position_x, row.position_y) {
            (Some(x), Some(y)) => Some(Position { x, y }),
            _ => None,
        };
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            maiden_name: row.maiden_name,
            gender: row.gender.unwrap_or_default(),
            birth_date: row.birth_date,
            death_date: row.death_date,
            birth_place: row.birth_place,
            death_place: row.death_place,
            occupation: row.occupation,
            email: row.email,
            phone: row.phone,
            current_address: row.current_address,
            notes: row.notes,
            photo_url: row.photo_url,
            data: row.data,
            position,
        }
    }
}

impl From<Person> for PersonRow {
    fn from(person: Person) -> Self {
        Self {
            id: person.id,
            first_name: person.first_name,
            last_name: person.last_name,
            maiden_name: person.maiden_name,
            birth_date: person.birth_date,
            death_date: person.death_date,
            birth_place: person.birth_place,
            death_place: person.death_place,
            gender: match person.gender {
                Gender::Unspecified => None,
                other => Some(other),
            },
            occupation: person.occupation,
            notes: person.notes,
            photo_url: person.photo_url,
            email: person.email,
            phone: person.phone,
            current_address: person.current_address,
            data: person.data,
            position_x: person.position.map(|pos| pos.x),
            position_y: person.position.map(|pos| pos.y),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentOf {
    pub parent_id: String,
    pub child_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parent_type: ParentType,
}

impl ParentOf {
    pub fn new(parent_id: impl Into<String>, child_id: impl Into<String>) -> Self {
        Self {
            parent_id: parent_id.into(),
            child_id: child_id.into(),
            parent_type: ParentType::Biological,
        }
    }

    pub fn with_type(mut self, parent_type: ParentType) -> Self {
        self.parent_type = parent_type;
        self
    }

    pub fn edge_id(&self) -> String {
        format!("parent-{}-{}", self.parent_id, self.child_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Union {
    pub person1_id: String,
    pub person2_id: String,
    #[serde(rename = "unionId", default)]
    pub union_id: Option<String>,
    #[serde(rename = "type", default)]
    pub union_type: Option<UnionType>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: UnionStatus,
    #[serde(rename = "startDate", default)]
    pub start_date: Option<String>,
    #[serde(rename = "endDate", default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Union {
    pub fn new(person1_id: impl Into<String>, person2_id: impl Into<String>) -> Self {
        Self {
            person1_id: person1_id.into(),
            person2_id: person2_id.into(),
            union_id: None,
            union_type: None,
            status: UnionStatus::Ongoing,
            start_date: None,
            end_date: None,
            place: None,
            notes: None,
        }
    }

    pub fn with_status(mut self, status: UnionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn edge_id(&self) -> String {
        format!("union-{}-{}", self.person1_id, self.person2_id)
    }

    pub fn involves(&self, person_id: &str) -> bool {
        self.person1_id == person_id || self.person2_id == person_id
    }

    /// The other endpoint, if `person_id` is one of the two partners.
    pub fn partner_of(&self, person_id: &str) -> Option<&str> {
        if self.person1_id == person_id {
            Some(&self.person2_id)
        } else if self.person2_id == person_id {
            Some(&self.person1_id)
        } else {
            None
        }
    }

    pub fn start_year(&self) -> Option<i32> {
        self.start_date.as_deref().and_then(year_of)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One loaded snapshot of the tree. Replaced wholesale on every reload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyGraph {
    #[serde(default)]
    pub nodes: Vec<Person>,
    #[serde(rename = "parentOf", default)]
    pub parent_of: Vec<ParentOf>,
    #[serde(default)]
    pub unions: Vec<Union>,
}

impl FamilyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn person(&self, id: &str) -> Option<&Person> {
        self.nodes.iter().find(|person| person.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.person(id).is_some()
    }

    pub fn union_by_edge_id(&self, edge_id: &str) -> Option<&Union> {
        self.unions.iter().find(|union| union.edge_id() == edge_id)
    }

    /// Parses a snapshot from JSON, falling back to JSON5 for hand-written files.
    pub fn from_json(input: &str) -> anyhow::Result<Self> {
        match serde_json::from_str(input) {
            Ok(graph) => Ok(graph),
            Err(json_err) => json5::from_str(input).map_err(|json5_err| {
                anyhow::anyhow!("invalid graph snapshot: {json_err} (json5: {json5_err})")
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maiden_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl PersonInput {
    /// Pre-fills an edit form from an existing record.
    pub fn from_person(person: &Person) -> Self {
        Self {
            first_name: person.first_name.clone(),
            last_name: person.last_name.clone(),
            maiden_name: person.maiden_name.clone(),
            birth_date: person.birth_date.clone(),
            death_date: person.death_date.clone(),
            birth_place: person.birth_place.clone(),
            death_place: person.death_place.clone(),
            gender: match person.gender {
                Gender::Unspecified => None,
                other => Some(other),
            },
            occupation: person.occupation.clone(),
            notes: person.notes.clone(),
            photo_url: person.photo_url.clone(),
            email: person.email.clone(),
            phone: person.phone.clone(),
            current_address: person.current_address.clone(),
            data: person.data.clone(),
        }
    }

    /// Writes the form fields onto `person`, leaving its id and position alone.
    pub fn apply_to(&self, person: &mut Person) {
        person.first_name = self.first_name.clone();
        person.last_name = self.last_name.clone();
        person.maiden_name = self.maiden_name.clone();
        person.birth_date = self.birth_date.clone();
        person.death_date = self.death_date.clone();
        person.birth_place = self.birth_place.clone();
        person.death_place = self.death_place.clone();
        person.gender = self.gender.unwrap_or_default();
        person.occupation = self.occupation.clone();
        person.notes = self.notes.clone();
        person.photo_url = self.photo_url.clone();
        person.email = self.email.clone();
        person.phone = self.phone.clone();
        person.current_address = self.current_address.clone();
        person.data = self.data.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnionInput {
    pub person1_id: String,
    pub person2_id: String,
    #[serde(rename = "unionId", skip_serializing_if = "Option::is_none")]
    pub union_id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub union_type: Option<UnionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UnionStatus>,
    #[serde(rename = "startDate", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl UnionInput {
    pub fn between(person1_id: impl Into<String>, person2_id: impl Into<String>) -> Self {
        Self {
            person1_id: person1_id.into(),
            person2_id: person2_id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParentOfInput {
    pub parent_id: String,
    pub child_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_type: Option<ParentType>,
}

impl ParentOfInput {
    pub fn new(parent_id: impl Into<String>, child_id: impl Into<String>) -> Self {
        Self {
            parent_id: parent_id.into(),
            child_id: child_id.into(),
            parent_type: None,
        }
    }
}
