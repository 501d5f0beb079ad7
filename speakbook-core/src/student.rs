//! Student records.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentDto {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<&Student> for StudentDto {
    fn from(student: &Student) -> Self {
        Self {
            id: Some(student.id),
            name: student.name.clone(),
            email: Some(student.email.clone()),
        }
    }
}

impl StudentDto {
    pub fn into_entity(self) -> Student {
        Student {
            id: self.id.unwrap_or(0),
            name: self.name,
            email: self.email.unwrap_or_default(),
        }
    }
}
