//! Offers of ten candidates.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::adapters::offer10_sea as offer10_adapter;
use crate::domain::board::Point;
use crate::entities::offer10;
use crate::errors::domain::{DomainError, InfraErrorKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Offer10 {
    pub id: i64,
    pub game_id: i64,
    pub proposer_agent_id: i64,
    pub candidates: Vec<Point>,
    pub selected: Option<Point>,
}

impl Offer10 {
    pub fn contains(&self, at: Point) -> bool {
        self.candidates.contains(&at)
    }
}

impl TryFrom<offer10::Model> for Offer10 {
    type Error = DomainError;

    fn try_from(model: offer10::Model) -> Result<Self, Self::Error> {
        let candidates: Vec<Point> = serde_json::from_str(&model.candidates).map_err(|_| {
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("offer {} has corrupt candidates", model.id),
            )
        })?;
        let selected = match (model.selected_x, model.selected_y) {
            (Some(x), Some(y)) => Point::try_new(i64::from(x), i64::from(y)),
            _ => None,
        };
        Ok(Self {
            id: model.id,
            game_id: model.game_id,
            proposer_agent_id: model.proposer_agent_id,
            candidates,
            selected,
        })
    }
}

pub async fn create_offer<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    proposer_agent_id: i64,
    candidates: &[Point],
) -> Result<Offer10, DomainError> {
    let json = serde_json::to_string(candidates).map_err(|e| {
        DomainError::infra(
            InfraErrorKind::Other("Serialize".into()),
            format!("candidates failed to encode: {e}"),
        )
    })?;
    Offer10::try_from(offer10_adapter::create_offer(conn, game_id, proposer_agent_id, json).await?)
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    offer_id: i64,
) -> Result<Option<Offer10>, DomainError> {
    offer10_adapter::find_by_id(conn, offer_id)
        .await?
        .map(Offer10::try_from)
        .transpose()
}

pub async fn find_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Option<Offer10>, DomainError> {
    offer10_adapter::find_by_game(conn, game_id)
        .await?
        .map(Offer10::try_from)
        .transpose()
}

pub async fn record_selection<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    offer_id: i64,
    at: Point,
) -> Result<Offer10, DomainError> {
    let Some(row) = offer10_adapter::find_by_id(conn, offer_id).await? else {
        return Err(DomainError::not_found(
            crate::errors::domain::NotFoundKind::Offer10,
            format!("Offer {offer_id} not found"),
        ));
    };
    let updated =
        offer10_adapter::record_selection(conn, row, i16::from(at.x), i16::from(at.y)).await?;
    Offer10::try_from(updated)
}
