//! Shape check for decoded model output.

use serde_json::Value;

use policysage_core::{ComparisonResult, Error, Result, COMMENTARY_FIELD, TABLE_FIELD};

/// Accept only an object with exactly the two required fields, both strings.
pub fn validate_result(value: Value) -> Result<ComparisonResult> {
    let Value::Object(mut object) = value else {
        return Err(Error::Structural("response is not a JSON object".into()));
    };

    let extra: Vec<&str> = object
        .keys()
        .map(String::as_str)
        .filter(|k| *k != COMMENTARY_FIELD && *k != TABLE_FIELD)
        .collect();
    if !extra.is_empty() {
        return Err(Error::Structural(format!(
            "unexpected keys: {}",
            extra.join(", ")
        )));
    }

    let commentary = take_string(&mut object, COMMENTARY_FIELD)?;
    let table_markup = take_string(&mut object, TABLE_FIELD)?;
    Ok(ComparisonResult {
        commentary,
        table_markup,
    })
}

fn take_string(object: &mut serde_json::Map<String, Value>, key: &str) -> Result<String> {
    match object.remove(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(Error::Structural(format!("`{key}` is not a string"))),
        None => Err(Error::Structural(format!("missing `{key}`"))),
    }
}
