//! Lookup-table encoding for the categorical request fields.
//!
//! Unknown categories never fail: they encode to 0.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoricalField {
    Continent,
    EducationOfEmployee,
    HasJobExperience,
    RequiresJobTraining,
    RegionOfEmployment,
    UnitOfWage,
    FullTimePosition,
}

const CONTINENT: &[(&str, i64)] = &[
    ("Asia", 0),
    ("Europe", 1),
    ("Africa", 2),
    ("North America", 3),
    ("South America", 4),
    ("Oceania", 5),
];

const EDUCATION: &[(&str, i64)] = &[
    ("Bachelor's", 0),
    ("High School", 1),
    ("Master's", 2),
    ("Doctorate", 3),
];

const YES_NO: &[(&str, i64)] = &[("No", 0), ("Yes", 1)];

const REGION: &[(&str, i64)] = &[("Midwest", 0), ("Northeast", 1), ("West", 2), ("South", 3)];

const UNIT_OF_WAGE: &[(&str, i64)] = &[("Hour", 0), ("Year", 1), ("Week", 2), ("Month", 3)];

impl CategoricalField {
    pub const ALL: [CategoricalField; 7] = [
        CategoricalField::Continent,
        CategoricalField::EducationOfEmployee,
        CategoricalField::HasJobExperience,
        CategoricalField::RequiresJobTraining,
        CategoricalField::RegionOfEmployment,
        CategoricalField::UnitOfWage,
        CategoricalField::FullTimePosition,
    ];

    /// Request key, which is also the feature column name.
    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::Continent => "continent",
            CategoricalField::EducationOfEmployee => "education_of_employee",
            CategoricalField::HasJobExperience => "has_job_experience",
            CategoricalField::RequiresJobTraining => "requires_job_training",
            CategoricalField::RegionOfEmployment => "region_of_employment",
            CategoricalField::UnitOfWage => "unit_of_wage",
            CategoricalField::FullTimePosition => "full_time_position",
        }
    }

    /// Category substituted when the request omits the field.
    pub fn default_value(self) -> &'static str {
        match self {
            CategoricalField::Continent => "Asia",
            CategoricalField::EducationOfEmployee => "Bachelor's",
            CategoricalField::HasJobExperience => "No",
            CategoricalField::RequiresJobTraining => "No",
            CategoricalField::RegionOfEmployment => "South",
            CategoricalField::UnitOfWage => "Hour",
            CategoricalField::FullTimePosition => "Yes",
        }
    }

    fn table(self) -> &'static [(&'static str, i64)] {
        match self {
            CategoricalField::Continent => CONTINENT,
            CategoricalField::EducationOfEmployee => EDUCATION,
            CategoricalField::HasJobExperience
            | CategoricalField::RequiresJobTraining
            | CategoricalField::FullTimePosition => YES_NO,
            CategoricalField::RegionOfEmployment => REGION,
            CategoricalField::UnitOfWage => UNIT_OF_WAGE,
        }
    }
}

/// How a categorical field appeared in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawCategory<'a> {
    Absent,
    /// Present but not a string (null, number, object, ...).
    NotText,
    Text(&'a str),
}

/// Encode one categorical value. Absent values take the field default;
/// anything that is not a key of the field's table encodes to 0.
pub fn encode(field: CategoricalField, raw: RawCategory<'_>) -> i64 {
    let value = match raw {
        RawCategory::Absent => field.default_value(),
        RawCategory::NotText => return 0,
        RawCategory::Text(value) => value,
    };

    field
        .table()
        .iter()
        .find(|(key, _)| *key == value)
        .map(|(_, code)| *code)
        .unwrap_or(0)
}
