//! Employee directory records linked from trading users.

use serde::{Deserialize, Serialize};

/// An organizational department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: u32,
    /// Short code, e.g. `EQUITY`, `FX`.
    pub department_code: String,
    pub department_name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub active: bool,
}

/// An employee, optionally embedding their department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub department: Option<Department>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_from_directory_json() {
        let json = r#"{
            "id": 4,
            "firstName": "Ada",
            "lastName": "Byron",
            "email": "ada@example.com",
            "department": {
                "id": 2,
                "departmentCode": "FX",
                "departmentName": "Foreign Exchange",
                "active": true
            }
        }"#;
        let emp: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(emp.full_name(), "Ada Byron");
        let dept = emp.department.unwrap();
        assert_eq!(dept.department_code, "FX");
        assert!(dept.location.is_none());
    }
}
