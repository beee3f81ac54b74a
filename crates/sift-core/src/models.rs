//! Domain models and strongly-typed identifiers.
//!
//! Defines content records, moderation partitions, relay ledger entries and
//! newtype ID wrappers for compile-time type safety. Includes database
//! serialization traits for the SQLite storage layer.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

type Db = sqlx::Sqlite;
type SqliteTypeInfo = sqlx::sqlite::SqliteTypeInfo;
type SqliteValueRef<'r> = sqlx::sqlite::SqliteValueRef<'r>;
type SqliteArgumentBuffer<'q> = Vec<sqlx::sqlite::SqliteArgumentValue<'q>>;
type EncodeResult =
    Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync + 'static>>;
type BoxDynError = sqlx::error::BoxDynError;

/// Strongly-typed content record identifier.
///
/// Wraps a UUID to prevent mixing with other ID types. The identifier is
/// assigned at ingestion and preserved verbatim across partition moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(pub Uuid);

impl ContentId {
    /// Creates a new random content ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ContentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl sqlx::Type<Db> for ContentId {
    fn type_info() -> SqliteTypeInfo {
        <Uuid as sqlx::Type<Db>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, Db> for ContentId {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let uuid = <Uuid as sqlx::Decode<Db>>::decode(value)?;
        Ok(Self(uuid))
    }
}

impl<'q> sqlx::Encode<'q, Db> for ContentId {
    fn encode_by_ref(&self, buf: &mut SqliteArgumentBuffer<'q>) -> EncodeResult {
        <Uuid as sqlx::Encode<'q, Db>>::encode_by_ref(&self.0, buf)
    }
}

/// Strongly-typed relay ledger entry identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerEntryId(pub Uuid);

impl LedgerEntryId {
    /// Creates a new random ledger entry ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LedgerEntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LedgerEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for LedgerEntryId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl sqlx::Type<Db> for LedgerEntryId {
    fn type_info() -> SqliteTypeInfo {
        <Uuid as sqlx::Type<Db>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, Db> for LedgerEntryId {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let uuid = <Uuid as sqlx::Decode<Db>>::decode(value)?;
        Ok(Self(uuid))
    }
}

impl<'q> sqlx::Encode<'q, Db> for LedgerEntryId {
    fn encode_by_ref(&self, buf: &mut SqliteArgumentBuffer<'q>) -> EncodeResult {
        <Uuid as sqlx::Encode<'q, Db>>::encode_by_ref(&self.0, buf)
    }
}

/// Moderation partition a content record can live in.
///
/// Partition membership is table identity, not a column: a record exists in
/// exactly one partition table at any time. Approved and Rejected are
/// terminal; there is no transition out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    /// Awaiting a moderation decision.
    Pending,
    /// Approved by a reviewer. Terminal.
    Approved,
    /// Rejected by a reviewer. Terminal.
    Rejected,
}

impl Partition {
    /// Table backing this partition.
    pub const fn table(self) -> &'static str {
        match self {
            Self::Pending => "content_pending",
            Self::Approved => "content_approved",
            Self::Rejected => "content_rejected",
        }
    }

    /// All partitions, pending first.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for Partition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown partition: {other}")),
        }
    }
}

/// Outcome of a moderation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The reviewer approved the content.
    Approved,
    /// The reviewer rejected the content.
    Rejected,
}

impl Outcome {
    /// Partition a record lands in after this outcome.
    pub const fn partition(self) -> Partition {
        match self {
            Self::Approved => Partition::Approved,
            Self::Rejected => Partition::Rejected,
        }
    }

    /// Relay channel that carries notifications for this outcome.
    pub fn channel(self) -> RelayChannel {
        match self {
            Self::Approved => RelayChannel::on_approve(),
            Self::Rejected => RelayChannel::on_reject(),
        }
    }

    /// Both outcomes, in sweep order.
    pub const ALL: [Self; 2] = [Self::Approved, Self::Rejected];
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown outcome: {other}")),
        }
    }
}

impl sqlx::Type<Db> for Outcome {
    fn type_info() -> SqliteTypeInfo {
        <&str as sqlx::Type<Db>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, Db> for Outcome {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let s = <&str as sqlx::Decode<Db>>::decode(value)?;
        s.parse().map_err(Into::into)
    }
}

impl<'q> sqlx::Encode<'q, Db> for Outcome {
    fn encode_by_ref(&self, buf: &mut SqliteArgumentBuffer<'q>) -> EncodeResult {
        <String as sqlx::Encode<'q, Db>>::encode_by_ref(&self.to_string(), buf)
    }
}

/// Shape of a content payload.
///
/// Always derived from the payload itself, never set independently:
/// `mixed` requires both body and image, `image` means image only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Body text only.
    Text,
    /// Image reference only.
    Image,
    /// Both body text and an image reference.
    Mixed,
}

impl ContentKind {
    /// Derives the kind from the resolved body and image fields.
    pub fn derive(body: &str, image_ref: Option<&str>) -> Self {
        let has_image = image_ref.is_some_and(|r| !r.is_empty());
        match (!body.is_empty(), has_image) {
            (true, true) => Self::Mixed,
            (false, true) => Self::Image,
            _ => Self::Text,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Image => write!(f, "image"),
            Self::Mixed => write!(f, "mixed"),
        }
    }
}

impl sqlx::Type<Db> for ContentKind {
    fn type_info() -> SqliteTypeInfo {
        <&str as sqlx::Type<Db>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, Db> for ContentKind {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let s = <&str as sqlx::Decode<Db>>::decode(value)?;
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "mixed" => Ok(Self::Mixed),
            other => Err(format!("invalid content kind: {other}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, Db> for ContentKind {
    fn encode_by_ref(&self, buf: &mut SqliteArgumentBuffer<'q>) -> EncodeResult {
        <String as sqlx::Encode<'q, Db>>::encode_by_ref(&self.to_string(), buf)
    }
}

/// A moderated content item.
///
/// The record carries no partition field; which table holds it *is* its
/// moderation state. `created_at` is the origin timestamp and travels with
/// the record unchanged through partition moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContentRecord {
    /// Stable identifier, assigned at ingestion.
    pub id: ContentId,

    /// Headline or display title.
    pub title: String,

    /// Main content body.
    pub body: String,

    /// Optional image locator (URL or storage key).
    pub image_ref: Option<String>,

    /// Free-text classification label.
    pub category: String,

    /// Payload shape, derived from body and image.
    pub kind: ContentKind,

    /// Provenance locator for the original content, when known.
    pub source_ref: Option<String>,

    /// Origin timestamp. Never reset by moderation.
    pub created_at: DateTime<Utc>,
}

impl ContentRecord {
    /// Builds a record, deriving `kind` from the payload fields.
    pub fn new(
        id: ContentId,
        title: String,
        body: String,
        image_ref: Option<String>,
        category: String,
        source_ref: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let kind = ContentKind::derive(&body, image_ref.as_deref());
        Self { id, title, body, image_ref, category, kind, source_ref, created_at }
    }
}

/// Relay channel identifier.
///
/// Names an event type that outbound notifications are routed by. The two
/// moderation outcomes have well-known channels; additional channels can be
/// registered in the endpoint table without code changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelayChannel(String);

impl RelayChannel {
    /// Channel carrying approval notifications.
    pub fn on_approve() -> Self {
        Self("on-approve".to_string())
    }

    /// Channel carrying rejection notifications.
    pub fn on_reject() -> Self {
        Self("on-reject".to_string())
    }

    /// Wraps an arbitrary channel identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Channel identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable label placed in the outbound payload's `event` field.
    pub fn event_label(&self) -> &str {
        match self.0.as_str() {
            "on-approve" => "approved",
            "on-reject" => "rejected",
            other => other,
        }
    }
}

impl fmt::Display for RelayChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl sqlx::Type<Db> for RelayChannel {
    fn type_info() -> SqliteTypeInfo {
        <String as sqlx::Type<Db>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, Db> for RelayChannel {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let s = <String as sqlx::Decode<Db>>::decode(value)?;
        Ok(Self(s))
    }
}

impl<'q> sqlx::Encode<'q, Db> for RelayChannel {
    fn encode_by_ref(&self, buf: &mut SqliteArgumentBuffer<'q>) -> EncodeResult {
        <String as sqlx::Encode<'q, Db>>::encode_by_ref(&self.0, buf)
    }
}

/// Outbound webhook endpoint configuration for one relay channel.
///
/// The system models exactly one endpoint per channel. Disabled endpoints
/// are skipped by the dispatcher but obligations keep accruing, so enabling
/// an endpoint later picks up the backlog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RelayEndpoint {
    /// Event type this endpoint receives.
    pub channel: RelayChannel,

    /// Destination URL for the JSON POST.
    pub url: String,

    /// Soft on/off switch. Off means "not actionable yet", not "discard".
    pub enabled: bool,
}

/// Semantic field a spreadsheet column maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappedField {
    /// Record title.
    Title,
    /// Record body text.
    Body,
    /// Image locator.
    ImageRef,
    /// Classification label.
    Category,
    /// Column present in the sheet but not ingested.
    Ignored,
}

impl fmt::Display for MappedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Body => write!(f, "body"),
            Self::ImageRef => write!(f, "image_ref"),
            Self::Category => write!(f, "category"),
            Self::Ignored => write!(f, "ignored"),
        }
    }
}

impl FromStr for MappedField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "body" => Ok(Self::Body),
            "image_ref" => Ok(Self::ImageRef),
            "category" => Ok(Self::Category),
            "ignored" => Ok(Self::Ignored),
            other => Err(format!("unknown mapped field: {other}")),
        }
    }
}

impl sqlx::Type<Db> for MappedField {
    fn type_info() -> SqliteTypeInfo {
        <&str as sqlx::Type<Db>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, Db> for MappedField {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let s = <&str as sqlx::Decode<Db>>::decode(value)?;
        s.parse().map_err(Into::into)
    }
}

impl<'q> sqlx::Encode<'q, Db> for MappedField {
    fn encode_by_ref(&self, buf: &mut SqliteArgumentBuffer<'q>) -> EncodeResult {
        <String as sqlx::Encode<'q, Db>>::encode_by_ref(&self.to_string(), buf)
    }
}

/// Maps one positional spreadsheet column onto a semantic field.
///
/// `letter` uses spreadsheet addressing (A, B, ..., Z, AA, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ColumnMapping {
    /// Spreadsheet column letter.
    pub letter: String,

    /// Field the column's values feed.
    pub field: MappedField,
}

/// A recorded outbound notification obligation.
///
/// Created in the same transaction as the partition move that produced it.
/// `sent_at` is null until delivery is confirmed with a 2xx response; a null
/// value means delivery is still owed, however many passes that takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RelayLedgerEntry {
    /// Unique entry identifier.
    pub id: LedgerEntryId,

    /// Content record this obligation concerns. Weak reference: the record
    /// may be deleted from its partition independently of the ledger.
    pub content_id: ContentId,

    /// Moderation outcome that produced the obligation.
    pub outcome: Outcome,

    /// When the obligation was recorded.
    pub created_at: DateTime<Utc>,

    /// When delivery was confirmed. Set exactly once.
    pub sent_at: Option<DateTime<Utc>>,
}

impl RelayLedgerEntry {
    /// Whether delivery is still owed.
    pub fn is_unsent(&self) -> bool {
        self.sent_at.is_none()
    }
}
