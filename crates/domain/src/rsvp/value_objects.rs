//! Validated inputs for the RSVP workflow.

use guest_store::Rsvp;

/// Shortest accepted first or last name.
pub const MIN_NAME_LEN: usize = 2;
/// Longest accepted first or last name.
pub const MAX_NAME_LEN: usize = 20;
/// Highest selection (meal option) number.
pub const MAX_SELECTION: i64 = 2;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path of the field, e.g. `party.0.selection`.
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Structural validation failure; carries every rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation failed")?;
        for (i, error) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Returns `Ok(())` when no field failed.
    pub fn check(errors: Vec<FieldError>) -> Result<(), ValidationError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self::new(errors))
        }
    }
}

impl From<FieldError> for ValidationError {
    fn from(error: FieldError) -> Self {
        Self::new(vec![error])
    }
}

pub(super) fn join_field(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn parse_name_part(field: String, value: &str) -> Result<String, FieldError> {
    let len = value.chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Err(FieldError::new(
            field,
            format!("must be between {MIN_NAME_LEN} and {MAX_NAME_LEN} characters"),
        ));
    }
    if !value.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(FieldError::new(field, "must contain only letters"));
    }
    Ok(value.to_ascii_lowercase())
}

/// A case-folded first/last name pair used as the guest lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GuestName {
    first_name: String,
    last_name: String,
}

impl GuestName {
    /// Validates and lower-cases a name pair.
    pub fn parse(first_name: &str, last_name: &str) -> Result<Self, ValidationError> {
        Self::parse_at("", first_name, last_name).map_err(ValidationError::new)
    }

    /// Like [`GuestName::parse`], reporting fields under `prefix`.
    pub fn parse_at(
        prefix: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Self, Vec<FieldError>> {
        let first = parse_name_part(join_field(prefix, "first_name"), first_name);
        let last = parse_name_part(join_field(prefix, "last_name"), last_name);
        match (first, last) {
            (Ok(first_name), Ok(last_name)) => Ok(Self {
                first_name,
                last_name,
            }),
            (first, last) => Err([first.err(), last.err()].into_iter().flatten().collect()),
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }
}

impl std::fmt::Display for GuestName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// Meal option chosen by an attending guest (1 or 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selection(i16);

impl Selection {
    /// Returns the stored column value.
    pub fn value(&self) -> i16 {
        self.0
    }
}

/// A decided RSVP. Pending is not a decision, and only attending guests
/// carry a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Attending(Selection),
    NotAttending,
}

impl Decision {
    /// Validates a raw `(rsvp, selection)` pair from a submission.
    pub fn parse_at(prefix: &str, rsvp: Rsvp, selection: i64) -> Result<Self, FieldError> {
        let rsvp_field = || join_field(prefix, "rsvp");
        let selection_field = || join_field(prefix, "selection");

        if !(0..=MAX_SELECTION).contains(&selection) {
            return Err(FieldError::new(
                selection_field(),
                format!("must be between 0 and {MAX_SELECTION}"),
            ));
        }
        match rsvp {
            Rsvp::Pending => Err(FieldError::new(
                rsvp_field(),
                "must be ATTENDING or NOT_ATTENDING",
            )),
            Rsvp::NotAttending if selection != 0 => Err(FieldError::new(
                selection_field(),
                "must be 0 when not attending",
            )),
            Rsvp::NotAttending => Ok(Decision::NotAttending),
            Rsvp::Attending if selection == 0 => Err(FieldError::new(
                selection_field(),
                "is required when attending",
            )),
            // Range was checked above, so this fits in an i16.
            Rsvp::Attending => Ok(Decision::Attending(Selection(selection as i16))),
        }
    }

    /// Returns the status this decision records.
    pub fn rsvp(&self) -> Rsvp {
        match self {
            Decision::Attending(_) => Rsvp::Attending,
            Decision::NotAttending => Rsvp::NotAttending,
        }
    }

    /// Returns the selection column value (0 when not attending).
    pub fn selection(&self) -> i16 {
        match self {
            Decision::Attending(selection) => selection.value(),
            Decision::NotAttending => 0,
        }
    }

    pub fn is_attending(&self) -> bool {
        matches!(self, Decision::Attending(_))
    }
}
