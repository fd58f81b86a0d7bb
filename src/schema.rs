// src/schema.rs
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::errors::{PredictError, Result};

/// How a field's raw string is carried in the payload.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Numeric,
    Text,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// One form control. `name` doubles as the element id.
#[derive(Deserialize, Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,

    #[serde(default = "default_required")]
    pub required: bool,

    /// Non-empty options make the control a `<select>`.
    #[serde(default)]
    pub options: Vec<SelectOption>,

    #[serde(default)]
    pub placeholder: Option<String>,

    #[serde(default)]
    pub tooltip: Option<String>,
}

fn default_required() -> bool {
    true
}

#[derive(Deserialize, Debug, Clone)]
pub struct SectionSpec {
    pub title: String,
    pub fields: Vec<FieldSpec>,
}

/// The static field-classification table plus everything the page layout
/// needs to know about each field.
#[derive(Deserialize, Debug, Clone)]
pub struct FormSchema {
    pub title: String,

    #[serde(default)]
    pub subtitle: Option<String>,

    pub sections: Vec<SectionSpec>,

    /// Values written by the "Fill Sample Data" button, keyed by field id.
    #[serde(default)]
    pub sample: BTreeMap<String, String>,
}

impl FieldSpec {
    fn numeric(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind: FieldKind::Numeric,
            required: true,
            options: Vec::new(),
            placeholder: None,
            tooltip: None,
        }
    }

    fn choice(name: &str, label: &str, kind: FieldKind, options: &[(&str, &str)]) -> Self {
        let mut options: Vec<SelectOption> = options
            .iter()
            .map(|(value, label)| SelectOption {
                value: value.to_string(),
                label: label.to_string(),
            })
            .collect();
        options.insert(
            0,
            SelectOption {
                value: String::new(),
                label: format!("Select {}", label.to_lowercase()),
            },
        );
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required: true,
            options,
            placeholder: None,
            tooltip: None,
        }
    }

    fn placeholder(mut self, text: &str) -> Self {
        self.placeholder = Some(text.to_string());
        self
    }

    fn tooltip(mut self, text: &str) -> Self {
        self.tooltip = Some(text.to_string());
        self
    }

    pub fn is_select(&self) -> bool {
        !self.options.is_empty()
    }
}

impl FormSchema {
    /// The holiday-package form the prediction backend was trained for.
    pub fn builtin() -> Self {
        use FieldKind::{Numeric, Text};

        let personal = SectionSpec {
            title: "Personal Information".to_string(),
            fields: vec![
                FieldSpec::numeric("Age", "Age").placeholder("e.g. 35"),
                FieldSpec::choice("Gender", "Gender", Text, &[("Male", "Male"), ("Female", "Female")]),
                FieldSpec::choice(
                    "MaritalStatus",
                    "Marital Status",
                    Text,
                    &[
                        ("Single", "Single"),
                        ("Married", "Married"),
                        ("Divorced", "Divorced"),
                        ("Unmarried", "Unmarried"),
                    ],
                ),
                FieldSpec::numeric("MonthlyIncome", "Monthly Income").placeholder("e.g. 25000"),
            ],
        };

        let professional = SectionSpec {
            title: "Professional Details".to_string(),
            fields: vec![
                FieldSpec::choice(
                    "Occupation",
                    "Occupation",
                    Text,
                    &[
                        ("Salaried", "Salaried"),
                        ("Small Business", "Small Business"),
                        ("Large Business", "Large Business"),
                        ("Free Lancer", "Free Lancer"),
                    ],
                ),
                FieldSpec::choice(
                    "Designation",
                    "Designation",
                    Text,
                    &[
                        ("Executive", "Executive"),
                        ("Manager", "Manager"),
                        ("Senior Manager", "Senior Manager"),
                        ("AVP", "AVP"),
                        ("VP", "VP"),
                    ],
                ),
                FieldSpec::choice(
                    "CityTier",
                    "City Tier",
                    Numeric,
                    &[("1", "Tier 1"), ("2", "Tier 2"), ("3", "Tier 3")],
                ),
            ],
        };

        let travel = SectionSpec {
            title: "Travel Preferences".to_string(),
            fields: vec![
                FieldSpec::choice(
                    "ProductPitched",
                    "Product Pitched",
                    Text,
                    &[
                        ("Basic", "Basic"),
                        ("Standard", "Standard"),
                        ("Deluxe", "Deluxe"),
                        ("Super Deluxe", "Super Deluxe"),
                        ("King", "King"),
                    ],
                ),
                FieldSpec::choice(
                    "PreferredPropertyStar",
                    "Preferred Property Star",
                    Numeric,
                    &[("3", "3 Star"), ("4", "4 Star"), ("5", "5 Star")],
                )
                .tooltip("Star rating preference for accommodation"),
                FieldSpec::numeric("NumberOfTrips", "Number of Trips per Year").placeholder("e.g. 3"),
                FieldSpec::choice("Passport", "Passport", Numeric, &[("0", "No"), ("1", "Yes")]),
                FieldSpec::choice("OwnCar", "Own Car", Numeric, &[("0", "No"), ("1", "Yes")]),
                FieldSpec::numeric("NumberOfPersonVisiting", "Persons Visiting").placeholder("e.g. 2"),
                FieldSpec::numeric("NumberOfChildrenVisiting", "Children Visiting").placeholder("e.g. 1"),
            ],
        };

        let sales = SectionSpec {
            title: "Sales Interaction".to_string(),
            fields: vec![
                FieldSpec::choice(
                    "TypeofContact",
                    "Type of Contact",
                    Text,
                    &[("Self Enquiry", "Self Enquiry"), ("Company Invited", "Company Invited")],
                ),
                FieldSpec::numeric("DurationOfPitch", "Duration of Pitch (minutes)")
                    .placeholder("e.g. 15")
                    .tooltip("How long was the sales pitch in minutes?"),
                FieldSpec::numeric("NumberOfFollowups", "Number of Follow-ups")
                    .placeholder("e.g. 3")
                    .tooltip("How many follow-up contacts were made?"),
                FieldSpec::numeric("PitchSatisfactionScore", "Pitch Satisfaction Score")
                    .placeholder("1-5")
                    .tooltip("Customer satisfaction with the pitch (1-5 scale)"),
            ],
        };

        let sample = [
            ("Age", "35"),
            ("Gender", "Male"),
            ("MaritalStatus", "Married"),
            ("MonthlyIncome", "25000"),
            ("Occupation", "Salaried"),
            ("Designation", "Manager"),
            ("TypeofContact", "Self Enquiry"),
            ("CityTier", "1"),
            ("ProductPitched", "Deluxe"),
            ("PreferredPropertyStar", "4"),
            ("NumberOfTrips", "3"),
            ("Passport", "1"),
            ("OwnCar", "1"),
            ("DurationOfPitch", "15"),
            ("NumberOfFollowups", "3"),
            ("PitchSatisfactionScore", "4"),
            ("NumberOfPersonVisiting", "2"),
            ("NumberOfChildrenVisiting", "1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            title: "Holiday Package Prediction".to_string(),
            subtitle: Some("Predict whether a customer will purchase the holiday package".to_string()),
            sections: vec![personal, professional, travel, sales],
            sample,
        }
    }

    /// Parses and validates a schema written in TOML.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let schema: FormSchema = toml::from_str(source)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for field in self.fields() {
            if field.name.trim().is_empty() {
                return Err(PredictError::Config("field with an empty name".to_string()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(PredictError::Config(format!("duplicate field '{}'", field.name)));
            }
        }
        if let Some(unknown) = self.sample.keys().find(|k| !seen.contains(k.as_str())) {
            return Err(PredictError::Config(format!(
                "sample value for unknown field '{}'",
                unknown
            )));
        }
        Ok(())
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields().find(|f| f.name == name)
    }

    /// Names absent from the table are carried as text.
    pub fn kind_of(&self, name: &str) -> FieldKind {
        self.field(name).map_or(FieldKind::Text, |f| f.kind)
    }

    pub fn numeric_fields(&self) -> impl Iterator<Item = &str> {
        self.fields()
            .filter(|f| f.kind == FieldKind::Numeric)
            .map(|f| f.name.as_str())
    }

    pub fn tooltips(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields()
            .filter_map(|f| f.tooltip.as_deref().map(|t| (f.name.as_str(), t)))
    }
}

impl Default for FormSchema {
    fn default() -> Self {
        Self::builtin()
    }
}
