//! [`SqliteStore`]: the SQLite implementation of the Glossa storage traits.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use glossa_core::{
  annotation::{Annotation, NewAnnotation},
  identity::UserId,
  store::{AnnotationStore, Store, SubscriptionRegistry, UserDirectory},
  subscription::{NewSubscription, Subscription, SubscriptionType},
  user::{NewUser, User, normalize_username},
};

use crate::{
  Error, Result,
  encode::{
    ANNOTATION_COLUMNS, RawAnnotation, RawSubscription, RawUser, SUBSCRIPTION_COLUMNS,
    USER_COLUMNS, encode_document, encode_dt, encode_permissions, encode_references,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Glossa store backed by a single SQLite file.
///
/// Clones share one reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a private in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn annotation_by_id(&self, id: &str) -> Result<Option<Annotation>> {
    let id = id.to_owned();
    let sql = format!("SELECT {ANNOTATION_COLUMNS} FROM annotations WHERE id = ?1");

    let raw: Option<RawAnnotation> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], RawAnnotation::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAnnotation::into_annotation).transpose()
  }

  async fn subscription_by_id(&self, id: i64) -> Result<Option<Subscription>> {
    let sql = format!("SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE id = ?1");

    let raw: Option<RawSubscription> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], RawSubscription::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubscription::into_subscription).transpose()
  }

  /// Run a single-row user query with one text parameter.
  async fn user_where(&self, condition: &'static str, value: String) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {condition}");

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![value], RawUser::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }
}

impl Store for SqliteStore {
  type Error = Error;
}

// ─── AnnotationStore impl ────────────────────────────────────────────────────

impl AnnotationStore for SqliteStore {
  async fn fetch_annotation(&self, id: &str) -> Result<Option<Annotation>> {
    self.annotation_by_id(id).await
  }

  async fn create_annotation(&self, input: NewAnnotation) -> Result<Annotation> {
    let now = Utc::now();
    let annotation = Annotation {
      id:          Uuid::new_v4().to_string(),
      userid:      input.userid,
      created:     now,
      updated:     now,
      uri:         input.uri,
      text:        input.text,
      references:  input.references,
      permissions: input.permissions,
      document:    input.document,
    };

    let id               = annotation.id.clone();
    let userid           = annotation.userid.to_string();
    let created          = encode_dt(annotation.created);
    let updated          = encode_dt(annotation.updated);
    let uri              = annotation.uri.clone();
    let text             = annotation.text.clone();
    let references_json  = encode_references(&annotation.references)?;
    let permissions_json = encode_permissions(&annotation.permissions)?;
    let document_json    = annotation.document.as_ref().map(encode_document).transpose()?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO annotations (
             id, userid, created, updated, uri, text,
             references_json, permissions_json, document_json
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id,
            userid,
            created,
            updated,
            uri,
            text,
            references_json,
            permissions_json,
            document_json,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(annotation)
  }

  async fn update_annotation_text(
    &self,
    id: &str,
    text: Option<String>,
  ) -> Result<Option<Annotation>> {
    let id_owned = id.to_owned();
    let updated  = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE annotations SET text = ?2, updated = ?3 WHERE id = ?1",
          rusqlite::params![id_owned, text, updated],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.annotation_by_id(id).await
  }

  async fn delete_annotation(&self, id: &str) -> Result<Option<Annotation>> {
    let Some(annotation) = self.annotation_by_id(id).await? else {
      return Ok(None);
    };

    let id_owned = id.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM annotations WHERE id = ?1", rusqlite::params![id_owned])?;
        Ok(())
      })
      .await?;

    Ok(Some(annotation))
  }
}

// ─── UserDirectory impl ──────────────────────────────────────────────────────

impl UserDirectory for SqliteStore {
  async fn fetch_user(&self, userid: &UserId) -> Result<Option<User>> {
    let username  = userid.username().to_owned();
    let authority = userid.authority().to_owned();
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1 AND authority = ?2");

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![username, authority], RawUser::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
    self.user_where("uid = ?1", normalize_username(username)).await
  }

  async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
    self.user_where("email_key = ?1", email.to_lowercase()).await
  }

  async fn add_user(&self, input: NewUser) -> Result<Option<User>> {
    let registered_at = Utc::now();

    let uid           = normalize_username(input.username());
    let username      = input.username().to_owned();
    let authority     = input.authority().to_owned();
    let email         = input.email().to_owned();
    let email_key     = input.email().to_lowercase();
    let display_name  = input.display_name.clone();
    let at_str        = encode_dt(registered_at);

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO users
             (uid, username, authority, email, email_key, display_name, registered_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![uid, username, authority, email, email_key, display_name, at_str],
        );
        match inserted {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            Ok(None)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    let Some(id) = id else {
      return Ok(None);
    };

    Ok(Some(User {
      id,
      username: input.username().to_owned(),
      authority: input.authority().to_owned(),
      email: input.email().to_owned(),
      display_name: input.display_name,
      admin: false,
      staff: false,
      registered_at,
    }))
  }
}

// ─── SubscriptionRegistry impl ───────────────────────────────────────────────

impl SubscriptionRegistry for SqliteStore {
  async fn create_subscription(&self, input: NewSubscription) -> Result<Subscription> {
    let target = input.target.to_string();
    let kind   = input.kind.as_str();
    let active = input.active;

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subscriptions (target, type, active) VALUES (?1, ?2, ?3)",
          rusqlite::params![target, kind, active],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Subscription { id, target: input.target, kind: input.kind, active: input.active })
  }

  async fn find_active(
    &self,
    target: &UserId,
    kind: SubscriptionType,
  ) -> Result<Option<Subscription>> {
    let target = target.to_string();
    let kind   = kind.as_str();
    let sql = format!(
      "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions
       WHERE target = ?1 AND type = ?2 AND active = 1
       ORDER BY id
       LIMIT 1"
    );

    let raw: Option<RawSubscription> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![target, kind], RawSubscription::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubscription::into_subscription).transpose()
  }

  async fn list_subscriptions(&self, target: &UserId) -> Result<Vec<Subscription>> {
    let target = target.to_string();
    let sql = format!(
      "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE target = ?1 ORDER BY id"
    );

    let raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![target], RawSubscription::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubscription::into_subscription).collect()
  }

  async fn set_active(&self, id: i64, active: bool) -> Result<Option<Subscription>> {
    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subscriptions SET active = ?2 WHERE id = ?1",
          rusqlite::params![id, active],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.subscription_by_id(id).await
  }
}
