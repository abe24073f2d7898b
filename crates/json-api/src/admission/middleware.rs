//! Admission middleware.

use std::sync::Arc;

use salvo::{
    http::header::{AUTHORIZATION, HeaderValue, VARY},
    prelude::*,
};

use greenlight_app::{admission::Admission, identity::VARY_HEADER};

use crate::state::State;

use super::{client::client_key, errors::refuse};

/// Rate limit the caller, resolve who they are, then hand on to routing.
#[salvo::handler]
pub(crate) async fn admit(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let state = match depot.obtain::<Arc<State>>() {
        Ok(state) => Arc::clone(state),
        Err(_error) => {
            res.render(StatusError::internal_server_error());

            return;
        }
    };

    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

    let mut admission = Admission::new(client_key(req), authorization);

    // Refusals raised before identity resolution still depend on the credential.
    admission.add_vary(VARY_HEADER);

    let admitted = state.admission.run(&mut admission).await;

    for header in admission.vary() {
        res.headers_mut()
            .append(VARY, HeaderValue::from_static(*header));
    }

    match admitted {
        Ok(()) => {
            depot.inject(admission);

            ctrl.call_next(req, depot, res).await;
        }
        Err(error) => refuse(res, ctrl, error),
    }
}
