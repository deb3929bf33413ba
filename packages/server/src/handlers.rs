//! HTTP handler functions for the festival map API.

use actix_web::{HttpResponse, web};
use festival_map_catalog::{CatalogError, load_into};
use festival_map_filter::filter_options;
use festival_map_server_models::{
    ApiError, ApiFestivalDetail, ApiFestivalList, ApiHealth, ApiMapView, ApiStatus,
    FestivalQueryParams, MapQueryParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/festivals`
///
/// Returns the festivals matching the query parameters.
pub async fn festivals(
    state: web::Data<AppState>,
    params: web::Query<FestivalQueryParams>,
) -> HttpResponse {
    let criteria = match params.criteria() {
        Ok(criteria) => criteria,
        Err(e) => return HttpResponse::BadRequest().json(ApiError::new(e.to_string())),
    };

    let catalog = state.catalog.read().await;
    let list: ApiFestivalList = catalog.query(&criteria).into_iter().collect();
    drop(catalog);

    HttpResponse::Ok().json(list)
}

/// `GET /api/festivals/{id}`
///
/// Returns the detail panel of one festival, whether or not the active
/// filter hides it.
pub async fn festival(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    let catalog = state.catalog.read().await;

    catalog.detail_by_key(&id).map_or_else(
        || not_found(&id),
        |record| HttpResponse::Ok().json(ApiFestivalDetail::from(record)),
    )
}

/// `GET /api/festivals/{id}/focus`
///
/// Returns the viewport centred on one festival.
pub async fn festival_focus(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    let catalog = state.catalog.read().await;

    catalog.detail_by_key(&id).map_or_else(
        || not_found(&id),
        |record| HttpResponse::Ok().json(festival_map_map::focus(record, &state.map_defaults)),
    )
}

/// `GET /api/map`
///
/// Returns markers and the fitted viewport for the matching festivals,
/// or a `GeoJSON` `FeatureCollection` when `format=geojson`.
pub async fn map(state: web::Data<AppState>, params: web::Query<MapQueryParams>) -> HttpResponse {
    let criteria = match params.filter.criteria() {
        Ok(criteria) => criteria,
        Err(e) => return HttpResponse::BadRequest().json(ApiError::new(e.to_string())),
    };

    let catalog = state.catalog.read().await;
    let view = festival_map_map::present(catalog.query(&criteria), &state.map_defaults);
    drop(catalog);

    if params.wants_geojson() {
        HttpResponse::Ok().json(festival_map_map::to_feature_collection(&view))
    } else {
        HttpResponse::Ok().json(ApiMapView {
            view,
            defaults: state.map_defaults.clone(),
        })
    }
}

/// `GET /api/filters`
///
/// Returns the values available in each filter control.
pub async fn filters(state: web::Data<AppState>) -> HttpResponse {
    let catalog = state.catalog.read().await;
    let options = filter_options(catalog.full());
    drop(catalog);

    HttpResponse::Ok().json(options)
}

/// `GET /api/embed`
pub async fn embed(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.embed)
}

/// `POST /api/reload`
///
/// Reloads the catalog from the configured source. A source failure
/// keeps the previous festivals and answers 502 with the message.
pub async fn reload(state: web::Data<AppState>) -> HttpResponse {
    match load_into(&state.catalog, state.source.as_ref(), &state.fetch_options).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(CatalogError::Source(e)) => {
            log::error!("Reload from {} failed: {e}", state.source.id());
            HttpResponse::BadGateway().json(ApiError::new(e.to_string()))
        }
        Err(e @ CatalogError::StaleLoad { .. }) => {
            log::info!("{e}");
            HttpResponse::Conflict().json(ApiError::new(e.to_string()))
        }
    }
}

/// `GET /api/status`
pub async fn status(state: web::Data<AppState>) -> HttpResponse {
    let catalog = state.catalog.read().await.status();

    HttpResponse::Ok().json(ApiStatus {
        source: state.source.id().to_string(),
        catalog,
    })
}

fn not_found(id: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ApiError::new(format!("Festival not found: {id}")))
}
