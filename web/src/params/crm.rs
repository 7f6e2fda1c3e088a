use domain::crm_connection::CallbackParams;
use serde::Deserialize;
use utoipa::IntoParams;

/// Query string GoHighLevel appends when redirecting back from its consent screen.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub(crate) struct CallbackQuery {
    pub(crate) code: Option<String>,
    pub(crate) location_id: Option<String>,
    pub(crate) state: Option<String>,
}

impl From<CallbackQuery> for CallbackParams {
    fn from(query: CallbackQuery) -> Self {
        CallbackParams {
            code: query.code.filter(|code| !code.is_empty()),
            location_id: query.location_id.filter(|id| !id.is_empty()),
            state: query.state,
        }
    }
}
