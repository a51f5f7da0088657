//! The API endpoints URIs.
//!
//! For endpoints that take parameters, e.g., '/{module}/{uid}/balance', use [format_endpoint].

/// The route for recording a new transaction.
pub const TRANSACTION: &str = "/{module}/{uid}/transaction";
/// The route for getting a user's balance.
pub const BALANCE: &str = "/{module}/{uid}/balance";
/// The route for listing a user's transaction history.
pub const HISTORY: &str = "/{module}/{uid}/history";

/// Replace the parameters in `endpoint_path` with `values`, in order.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/{module}/{uid}/balance', '{module}'
/// and '{uid}' are parameters.
///
/// Parameters without a matching value are left as they are.
pub fn format_endpoint(endpoint_path: &str, values: &[&str]) -> String {
    let mut formatted = String::with_capacity(endpoint_path.len());
    let mut values = values.iter();
    let mut rest = endpoint_path;

    while let Some(param_start) = rest.find('{') {
        let Some(param_len) = rest[param_start..].find('}') else {
            break;
        };
        let param_end = param_start + param_len + 1;

        formatted.push_str(&rest[..param_start]);
        match values.next() {
            Some(value) => formatted.push_str(value),
            None => formatted.push_str(&rest[param_start..param_end]),
        }

        rest = &rest[param_end..];
    }

    formatted.push_str(rest);
    formatted
}
