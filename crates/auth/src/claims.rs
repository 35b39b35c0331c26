use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use staffdesk_core::EmployeeId;

/// Claim key carrying the authenticated employee id.
pub const EMP_ID_CLAIM: &str = "empId";

/// Registered claim keys the token service owns.
pub(crate) const ISSUED_AT: &str = "iat";
pub(crate) const EXPIRES_AT: &str = "exp";

/// `true` for keys the token service writes itself (`iat`, `exp`).
///
/// Callers may put them into [`Claims`], but they are replaced on issue and
/// removed on verification.
pub fn is_reserved_claim(key: &str) -> bool {
    key == ISSUED_AT || key == EXPIRES_AT
}

/// Caller-supplied key/value assertions embedded in a token payload.
///
/// `iat`/`exp` are reserved: managed by the token service, they never
/// survive a round trip (see [`is_reserved_claim`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Claims naming `id` as the token subject.
    pub fn for_employee(id: EmployeeId) -> Self {
        let mut claims = Self::new();
        claims.insert(EMP_ID_CLAIM, id.get());
        claims
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The subject identity, if present and a positive integer.
    ///
    /// Accepts the id either as a JSON number or a numeric string.
    pub fn employee_id(&self) -> Option<EmployeeId> {
        match self.0.get(EMP_ID_CLAIM)? {
            Value::Number(n) => EmployeeId::new(n.as_i64()?).ok(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub(crate) fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(value: Map<String, Value>) -> Self {
        let mut map = value;
        map.retain(|key, _| !is_reserved_claim(key));
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn employee_id_reads_number_or_numeric_string() {
        let claims = Claims::for_employee(EmployeeId::new(7).unwrap());
        assert_eq!(claims.employee_id().unwrap().get(), 7);

        let mut as_string = Claims::new();
        as_string.insert(EMP_ID_CLAIM, "12");
        assert_eq!(as_string.employee_id().unwrap().get(), 12);
    }

    #[test]
    fn employee_id_rejects_missing_or_odd_values() {
        assert!(Claims::new().employee_id().is_none());

        let mut claims = Claims::new();
        claims.insert(EMP_ID_CLAIM, json!({"nested": 1}));
        assert!(claims.employee_id().is_none());

        claims.insert(EMP_ID_CLAIM, -4);
        assert!(claims.employee_id().is_none());
    }

    #[test]
    fn from_map_drops_registered_times() {
        let map = json!({"empId": 3, "iat": 1.0, "exp": 2.0})
            .as_object()
            .cloned()
            .unwrap();
        let claims = Claims::from(map);
        assert_eq!(claims.len(), 1);
        assert!(claims.get("iat").is_none());
    }
}
