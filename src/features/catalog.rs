//! Field metadata for rendering the intake form.
//!
//! Labels and descriptions are serialized by the `/api/fields` endpoint so a
//! client can build the form without hardcoding the feature schema.

use serde::Serialize;

/// One input field of the intake form.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldInfo {
    /// Wire name, matching the classifier's training column
    pub name: &'static str,
    /// Human-friendly label
    pub label: &'static str,
    pub description: &'static str,
}

/// A titled group of related fields.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldGroup {
    pub title: &'static str,
    pub fields: &'static [FieldInfo],
}

pub const FIELD_GROUPS: &[FieldGroup] = &[
    FieldGroup {
        title: "Basic Health Metrics",
        fields: &[
            FieldInfo {
                name: "Pregnancies",
                label: "Number of Pregnancies",
                description: "Number of times the patient has been pregnant",
            },
            FieldInfo {
                name: "Glucose",
                label: "Glucose Level (mg/dL)",
                description: "Plasma glucose concentration 2 hours into an oral glucose tolerance test",
            },
            FieldInfo {
                name: "BloodPressure",
                label: "Blood Pressure (mmHg)",
                description: "Diastolic blood pressure (mm Hg)",
            },
            FieldInfo {
                name: "SkinThickness",
                label: "Skin Thickness (mm)",
                description: "Triceps skin fold thickness (mm)",
            },
            FieldInfo {
                name: "Insulin",
                label: "Insulin Level (μU/mL)",
                description: "2-hour serum insulin (mu U/ml)",
            },
            FieldInfo {
                name: "BMI",
                label: "Body Mass Index",
                description: "Body mass index (weight in kg / (height in m)^2)",
            },
            FieldInfo {
                name: "Age",
                label: "Age (years)",
                description: "Age of the patient in years",
            },
        ],
    },
    FieldGroup {
        title: "Calculated Metrics",
        fields: &[
            FieldInfo {
                name: "Glucose_BMI_Ratio",
                label: "Glucose/BMI Ratio",
                description: "Ratio of glucose level to BMI; helps identify abnormal combinations",
            },
            FieldInfo {
                name: "Age_Glucose_Int",
                label: "Age × Glucose Interaction",
                description: "Interaction term between age and glucose; may indicate risk escalation with age",
            },
            FieldInfo {
                name: "Insulin_BMI_Ratio",
                label: "Insulin/BMI Ratio",
                description: "Ratio of insulin level to BMI; relates body mass with insulin levels",
            },
            FieldInfo {
                name: "Age_BMI_Int",
                label: "Age × BMI Interaction",
                description: "Interaction between age and BMI; potential indicator of age-related obesity",
            },
            FieldInfo {
                name: "Glucose2",
                label: "Glucose Squared",
                description: "Square of glucose; used to model non-linear glucose effects",
            },
            FieldInfo {
                name: "BMI2",
                label: "BMI Squared",
                description: "Square of BMI; captures non-linear BMI-related health impact",
            },
        ],
    },
    FieldGroup {
        title: "Derived Indicators",
        fields: &[
            FieldInfo {
                name: "DiabetesPedigreeFunction",
                label: "Diabetes Pedigree Function",
                description: "Likelihood of diabetes based on family history",
            },
            FieldInfo {
                name: "Is_Obese",
                label: "Is Obese (0=No, 1=Yes)",
                description: "Boolean indicating if BMI exceeds the obesity threshold (BMI > 30)",
            },
            FieldInfo {
                name: "Is_Young",
                label: "Is Young (0=No, 1=Yes)",
                description: "Boolean flag if the person is considered young (age < 25)",
            },
            FieldInfo {
                name: "Pregnancies_log1p",
                label: "Log(Pregnancies + 1)",
                description: "Log-transformed pregnancies count for normalization (log(1 + x))",
            },
            FieldInfo {
                name: "Insulin_log1p",
                label: "Log(Insulin + 1)",
                description: "Log-transformed insulin for skew correction (log(1 + x))",
            },
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_all_wire_fields() {
        let total: usize = FIELD_GROUPS.iter().map(|g| g.fields.len()).sum();
        assert_eq!(total, 18);
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let mut names: Vec<&str> = FIELD_GROUPS
            .iter()
            .flat_map(|g| g.fields.iter().map(|f| f.name))
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 18);
    }
}
