use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::models::{
    CommunitySelf, GroupQueryResult, ItemData, ItemQueryResult, PortalError, PortalItem,
    PortalQueryParams, PortalSelf,
};
use crate::{common::SHARING_PATH, error::BootstrapError};

/// The sharing API reports failures inside a 200 response, so every payload
/// is either the expected shape or an `error` body.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortalResponse<T> {
    Error { error: PortalError },
    Ok(T),
}

async fn get_json<T: DeserializeOwned>(
    http_client: &Client,
    url: String,
    query: &[(&str, &str)],
) -> Result<T, BootstrapError> {
    let response: PortalResponse<T> = http_client
        .get(url)
        .query(query)
        .query(&[("f", "json")])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    match response {
        PortalResponse::Ok(value) => Ok(value),
        PortalResponse::Error { error } => Err(BootstrapError::PortalError {
            code: error.code,
            message: error.message,
        }),
    }
}

pub async fn fetch_item(
    http_client: &Client,
    portal_url: &str,
    id: &str,
) -> Result<PortalItem, BootstrapError> {
    get_json(
        http_client,
        format!("{portal_url}{SHARING_PATH}/rest/content/items/{id}"),
        &[],
    )
    .await
}

pub async fn fetch_item_data(
    http_client: &Client,
    portal_url: &str,
    id: &str,
) -> Result<ItemData, BootstrapError> {
    get_json(
        http_client,
        format!("{portal_url}{SHARING_PATH}/rest/content/items/{id}/data"),
        &[],
    )
    .await
}

pub async fn fetch_self(
    http_client: &Client,
    portal_url: &str,
) -> Result<PortalSelf, BootstrapError> {
    get_json(
        http_client,
        format!("{portal_url}{SHARING_PATH}/rest/portals/self"),
        &[],
    )
    .await
}

pub async fn query_groups(
    http_client: &Client,
    portal_url: &str,
    query: &str,
) -> Result<GroupQueryResult, BootstrapError> {
    get_json(
        http_client,
        format!("{portal_url}{SHARING_PATH}/rest/community/groups"),
        &[("q", query)],
    )
    .await
}

pub async fn query_items(
    http_client: &Client,
    portal_url: &str,
    params: &PortalQueryParams,
) -> Result<ItemQueryResult, BootstrapError> {
    let num = params.num.to_string();
    let start = params.start.to_string();
    get_json(
        http_client,
        format!("{portal_url}{SHARING_PATH}/rest/search"),
        &[
            ("q", params.query.as_str()),
            ("sortField", params.sort_field.as_str()),
            ("sortOrder", params.sort_order.as_str()),
            ("num", num.as_str()),
            ("start", start.as_str()),
        ],
    )
    .await
}

/// Whether a user is currently signed in against the portal.
pub async fn check_sign_in(
    http_client: &Client,
    portal_url: &str,
) -> Result<bool, BootstrapError> {
    let response: CommunitySelf = get_json(
        http_client,
        format!("{portal_url}{SHARING_PATH}/rest/community/self"),
        &[],
    )
    .await?;

    Ok(response.username.is_some())
}
