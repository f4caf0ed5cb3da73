use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Agents {
    Table,
    Id,
    Name,
    ApiKeyPrefix,
    ApiKeyHash,
    IsActive,
    Rating,
    GamesPlayed,
    Wins,
    Losses,
    Draws,
    LastSeenAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Games {
    Table,
    Id,
    Status,
    Phase,
    MoveNumber,
    TurnColor,
    TurnDeadlineAt,
    BlackAgentId,
    WhiteAgentId,
    WinnerColor,
    ResultReason,
    OpeningState,
    CreatedAt,
    UpdatedAt,
    Version,
}

#[derive(Iden)]
enum Moves {
    Table,
    Id,
    GameId,
    MoveNumber,
    X,
    Y,
    Color,
    IsForbidden,
    CreatedAt,
}

#[derive(Iden)]
enum Offer10 {
    #[iden = "offer10"]
    Table,
    Id,
    GameId,
    ProposerAgentId,
    Candidates,
    SelectedX,
    SelectedY,
    CreatedAt,
}

#[derive(Iden)]
enum MatchmakingQueue {
    Table,
    Id,
    AgentId,
    JoinedAt,
}

#[derive(Iden)]
enum MoveIdempotency {
    Table,
    Id,
    GameId,
    AgentId,
    IdempotencyKey,
    TurnNumber,
    X,
    Y,
    StatusCode,
    Response,
    CreatedAt,
    FinalizedAt,
}

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .primary_key()
        .auto_increment()
        .to_owned()
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // agents
        manager
            .create_table(
                Table::create()
                    .table(Agents::Table)
                    .if_not_exists()
                    .col(id_col(Agents::Id))
                    .col(ColumnDef::new(Agents::Name).string_len(32).not_null())
                    .col(ColumnDef::new(Agents::ApiKeyPrefix).string_len(16).not_null())
                    .col(ColumnDef::new(Agents::ApiKeyHash).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Agents::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Agents::Rating)
                            .integer()
                            .not_null()
                            .default(1500),
                    )
                    .col(
                        ColumnDef::new(Agents::GamesPlayed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Agents::Wins).integer().not_null().default(0))
                    .col(ColumnDef::new(Agents::Losses).integer().not_null().default(0))
                    .col(ColumnDef::new(Agents::Draws).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Agents::LastSeenAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(timestamp(Agents::CreatedAt))
                    .col(timestamp(Agents::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_agents_name")
                    .table(Agents::Table)
                    .col(Agents::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_agents_api_key_hash")
                    .table(Agents::Table)
                    .col(Agents::ApiKeyHash)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // games
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(id_col(Games::Id))
                    .col(
                        ColumnDef::new(Games::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Games::Phase)
                            .string_len(16)
                            .not_null()
                            .default("opening_1"),
                    )
                    .col(
                        ColumnDef::new(Games::MoveNumber)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Games::TurnColor)
                            .string_len(8)
                            .not_null()
                            .default("black"),
                    )
                    .col(
                        ColumnDef::new(Games::TurnDeadlineAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Games::BlackAgentId).big_integer().not_null())
                    .col(ColumnDef::new(Games::WhiteAgentId).big_integer().not_null())
                    .col(ColumnDef::new(Games::WinnerColor).string_len(8).null())
                    .col(ColumnDef::new(Games::ResultReason).string_len(32).null())
                    .col(ColumnDef::new(Games::OpeningState).text().not_null())
                    .col(timestamp(Games::CreatedAt))
                    .col(timestamp(Games::UpdatedAt))
                    .col(
                        ColumnDef::new(Games::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_games_black_agent_id")
                            .from(Games::Table, Games::BlackAgentId)
                            .to(Agents::Table, Agents::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_games_white_agent_id")
                            .from(Games::Table, Games::WhiteAgentId)
                            .to(Agents::Table, Agents::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_games_status_deadline")
                    .table(Games::Table)
                    .col(Games::Status)
                    .col(Games::TurnDeadlineAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_games_black_agent_id")
                    .table(Games::Table)
                    .col(Games::BlackAgentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_games_white_agent_id")
                    .table(Games::Table)
                    .col(Games::WhiteAgentId)
                    .to_owned(),
            )
            .await?;

        // moves
        manager
            .create_table(
                Table::create()
                    .table(Moves::Table)
                    .if_not_exists()
                    .col(id_col(Moves::Id))
                    .col(ColumnDef::new(Moves::GameId).big_integer().not_null())
                    .col(ColumnDef::new(Moves::MoveNumber).integer().not_null())
                    .col(ColumnDef::new(Moves::X).small_integer().not_null())
                    .col(ColumnDef::new(Moves::Y).small_integer().not_null())
                    .col(ColumnDef::new(Moves::Color).string_len(8).not_null())
                    .col(
                        ColumnDef::new(Moves::IsForbidden)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp(Moves::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_moves_game_id")
                            .from(Moves::Table, Moves::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_moves_game_move_number")
                    .table(Moves::Table)
                    .col(Moves::GameId)
                    .col(Moves::MoveNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_moves_game_cell")
                    .table(Moves::Table)
                    .col(Moves::GameId)
                    .col(Moves::X)
                    .col(Moves::Y)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // offer10
        manager
            .create_table(
                Table::create()
                    .table(Offer10::Table)
                    .if_not_exists()
                    .col(id_col(Offer10::Id))
                    .col(ColumnDef::new(Offer10::GameId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Offer10::ProposerAgentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Offer10::Candidates).text().not_null())
                    .col(ColumnDef::new(Offer10::SelectedX).small_integer().null())
                    .col(ColumnDef::new(Offer10::SelectedY).small_integer().null())
                    .col(timestamp(Offer10::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_offer10_game_id")
                            .from(Offer10::Table, Offer10::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_offer10_game_id")
                    .table(Offer10::Table)
                    .col(Offer10::GameId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // matchmaking_queue
        manager
            .create_table(
                Table::create()
                    .table(MatchmakingQueue::Table)
                    .if_not_exists()
                    .col(id_col(MatchmakingQueue::Id))
                    .col(
                        ColumnDef::new(MatchmakingQueue::AgentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(timestamp(MatchmakingQueue::JoinedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_matchmaking_queue_agent_id")
                            .from(MatchmakingQueue::Table, MatchmakingQueue::AgentId)
                            .to(Agents::Table, Agents::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_matchmaking_queue_agent_id")
                    .table(MatchmakingQueue::Table)
                    .col(MatchmakingQueue::AgentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_matchmaking_queue_joined_at")
                    .table(MatchmakingQueue::Table)
                    .col(MatchmakingQueue::JoinedAt)
                    .to_owned(),
            )
            .await?;

        // move_idempotency
        manager
            .create_table(
                Table::create()
                    .table(MoveIdempotency::Table)
                    .if_not_exists()
                    .col(id_col(MoveIdempotency::Id))
                    .col(
                        ColumnDef::new(MoveIdempotency::GameId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MoveIdempotency::AgentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MoveIdempotency::IdempotencyKey)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MoveIdempotency::TurnNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MoveIdempotency::X).small_integer().not_null())
                    .col(ColumnDef::new(MoveIdempotency::Y).small_integer().not_null())
                    .col(ColumnDef::new(MoveIdempotency::StatusCode).integer().null())
                    .col(ColumnDef::new(MoveIdempotency::Response).text().null())
                    .col(timestamp(MoveIdempotency::CreatedAt))
                    .col(
                        ColumnDef::new(MoveIdempotency::FinalizedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_move_idempotency_game_id")
                            .from(MoveIdempotency::Table, MoveIdempotency::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_move_idempotency_key")
                    .table(MoveIdempotency::Table)
                    .col(MoveIdempotency::GameId)
                    .col(MoveIdempotency::AgentId)
                    .col(MoveIdempotency::IdempotencyKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // reverse creation order; indexes go with their tables
        manager
            .drop_table(Table::drop().table(MoveIdempotency::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MatchmakingQueue::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Offer10::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Moves::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Games::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Agents::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
