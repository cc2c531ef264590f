//! Create/edit form bound to one admin resource.
//!
//! Submitting is split in two halves, [`EntityForm::prepare`] and
//! [`EntityForm::finish`], so a front-end can hold the request in flight
//! and still ask the form for a second submit (which answers `Busy`).
//! [`EntityForm::submit`] runs both halves against a gateway.

use crate::core::entities::EntityKind;
use crate::core::schema::{FieldErrors, Schema};
use crate::domain::ports::{EntityGateway, Notifier};
use crate::utils::error::{AdminError, Result};
use serde_json::{Map, Value};

pub const SUCCESS_MESSAGE: &str = "Success";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A previous submit has not finished yet.
    Busy,
    /// Client-side validation failed; nothing was sent.
    Invalid(FieldErrors),
    Saved(Value),
    /// The server refused the body; its messages are on the fields.
    Rejected(FieldErrors),
}

/// What to send for one submit.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub resource: &'static str,
    pub id: Option<i64>,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct EntityForm {
    kind: EntityKind,
    mode: FormMode,
    schema: Schema,
    values: Map<String, Value>,
    errors: FieldErrors,
    open: bool,
    submitting: bool,
}

impl EntityForm {
    pub fn create(kind: EntityKind) -> Self {
        Self::with_mode(kind, FormMode::Create, kind.create_schema())
    }

    pub fn edit(kind: EntityKind, id: i64) -> Self {
        Self::with_mode(kind, FormMode::Edit(id), kind.update_schema())
    }

    fn with_mode(kind: EntityKind, mode: FormMode, schema: Schema) -> Self {
        Self {
            kind,
            mode,
            schema,
            values: Map::new(),
            errors: FieldErrors::default(),
            open: true,
            submitting: false,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Closing drops messages; a create form also forgets what was typed.
    pub fn close(&mut self) {
        self.open = false;
        self.errors = FieldErrors::default();
        if self.mode == FormMode::Create {
            self.values.clear();
        }
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.values.insert(field.to_string(), value);
    }

    /// Prefill an edit form from the stored record.
    pub async fn load<G>(&mut self, gateway: &G) -> Result<()>
    where
        G: EntityGateway + ?Sized,
    {
        let id = match self.mode {
            FormMode::Edit(id) => id,
            FormMode::Create => {
                return Err(AdminError::ValidationError {
                    message: format!("a new {} has no record to load", self.kind),
                })
            }
        };

        let record = gateway.fetch(self.kind.resource(), id).await?;
        self.prefill(&record);
        tracing::debug!("📝 Loaded {} #{} into the form", self.kind, id);
        Ok(())
    }

    fn prefill(&mut self, record: &Value) {
        for rule in self.schema.fields() {
            if let Some(value) = record.get(rule.name) {
                self.values.insert(rule.name.to_string(), flatten_reference(value));
            }
        }
    }

    /// First half of a submit: validate and build the request.
    pub fn prepare(&mut self) -> std::result::Result<SubmitRequest, SubmitOutcome> {
        if self.submitting {
            return Err(SubmitOutcome::Busy);
        }

        match self.schema.validate(&self.values) {
            Ok(body) => {
                self.errors = FieldErrors::default();
                self.submitting = true;
                Ok(SubmitRequest {
                    resource: self.kind.resource(),
                    id: match self.mode {
                        FormMode::Create => None,
                        FormMode::Edit(id) => Some(id),
                    },
                    body: Value::Object(body),
                })
            }
            Err(errors) => {
                tracing::debug!("📝 {} form has {} invalid field(s)", self.kind, errors.len());
                self.errors = errors.clone();
                Err(SubmitOutcome::Invalid(errors))
            }
        }
    }

    /// Second half: apply the server's answer.
    pub fn finish<N, F>(&mut self, outcome: Result<Value>, notifier: &N, on_refresh: F) -> Result<SubmitOutcome>
    where
        N: Notifier + ?Sized,
        F: FnOnce(),
    {
        self.submitting = false;

        match outcome {
            Ok(record) => {
                self.close();
                notifier.success(SUCCESS_MESSAGE);
                on_refresh();
                Ok(SubmitOutcome::Saved(record))
            }
            // Only body rejections carry field messages; auth and lookup
            // failures keep their status.
            Err(AdminError::ApiStatusError {
                status: status @ (400 | 422),
                errors: server,
                ..
            }) => {
                let mut errors = FieldErrors::default();
                for (field, message) in server.iter() {
                    errors.insert(field, message);
                }
                let message = server
                    .first_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Request failed with status {}", status));
                tracing::warn!("❌ {} rejected by the server: {}", self.kind, message);
                notifier.error(&message);
                self.errors = errors.clone();
                Ok(SubmitOutcome::Rejected(errors))
            }
            Err(e) => {
                notifier.error(&e.user_friendly_message());
                Err(e)
            }
        }
    }

    /// Validate, send, and apply the answer. `on_refresh` runs once after a
    /// successful save and never otherwise.
    pub async fn submit<G, N, F>(&mut self, gateway: &G, notifier: &N, on_refresh: F) -> Result<SubmitOutcome>
    where
        G: EntityGateway + ?Sized,
        N: Notifier + ?Sized,
        F: FnOnce(),
    {
        let request = match self.prepare() {
            Ok(request) => request,
            Err(outcome) => return Ok(outcome),
        };

        tracing::info!(
            "🔄 {} {}",
            if request.id.is_some() { "Updating" } else { "Creating" },
            self.kind.label()
        );

        let outcome = match request.id {
            Some(id) => gateway.update(request.resource, id, &request.body).await,
            None => gateway.create(request.resource, &request.body).await,
        };
        self.finish(outcome, notifier, on_refresh)
    }
}

/// `{"id": 3, "name": ..}` becomes `3`; arrays of such objects become id arrays.
fn flatten_reference(value: &Value) -> Value {
    match value {
        Value::Object(map) => map.get("id").cloned().unwrap_or_else(|| value.clone()),
        Value::Array(items) => Value::Array(items.iter().map(flatten_reference).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ListResponse, NamedEntity};
    use crate::utils::error::ServerErrors;
    use async_trait::async_trait;
    use serde_json::json;
    use std::cell::Cell;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeGateway {
        calls: Mutex<Vec<(String, Option<i64>, Value)>>,
        reject_with: Option<Value>,
        record: Value,
    }

    impl FakeGateway {
        fn answer(&self, resource: &str, id: Option<i64>, body: &Value) -> Result<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((resource.to_string(), id, body.clone()));
            match &self.reject_with {
                Some(body) => Err(AdminError::ApiStatusError {
                    method: "POST".to_string(),
                    path: resource.to_string(),
                    status: 400,
                    errors: ServerErrors::from_body(body),
                }),
                None => {
                    let mut saved = body.clone();
                    saved["id"] = json!(id.unwrap_or(99));
                    Ok(saved)
                }
            }
        }
    }

    #[async_trait]
    impl EntityGateway for FakeGateway {
        async fn search(&self, _: &str, _: Option<&str>) -> Result<ListResponse<NamedEntity>> {
            Ok(ListResponse {
                count: 0,
                next: None,
                previous: None,
                results: Vec::new(),
            })
        }

        async fn fetch(&self, _: &str, _: i64) -> Result<Value> {
            Ok(self.record.clone())
        }

        async fn create(&self, resource: &str, body: &Value) -> Result<Value> {
            self.answer(resource, None, body)
        }

        async fn update(&self, resource: &str, id: i64, body: &Value) -> Result<Value> {
            self.answer(resource, Some(id), body)
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn success(&self, message: &str) {
            self.messages.lock().unwrap().push(format!("ok:{}", message));
        }

        fn error(&self, message: &str) {
            self.messages.lock().unwrap().push(format!("err:{}", message));
        }
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let gateway = FakeGateway::default();
        let notifier = RecordingNotifier::default();
        let refreshed = Cell::new(0);
        let mut form = EntityForm::create(EntityKind::Brand);
        form.set("name", json!(""));

        let outcome = form
            .submit(&gateway, &notifier, || refreshed.set(refreshed.get() + 1))
            .await
            .unwrap();

        match outcome {
            SubmitOutcome::Invalid(errors) => {
                assert_eq!(errors.get("name"), Some("name is a required field"))
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(gateway.calls.lock().unwrap().is_empty());
        assert_eq!(refreshed.get(), 0);
        assert!(form.is_open());
        assert!(form.errors().contains("name"));
    }

    #[tokio::test]
    async fn test_create_posts_coerced_body_and_refreshes_once() {
        let gateway = FakeGateway::default();
        let notifier = RecordingNotifier::default();
        let refreshed = Cell::new(0);
        let mut form = EntityForm::create(EntityKind::MeasurementRatio);
        form.set("ratio", json!("2.5"));
        form.set("first_unit_measure", json!("1"));
        form.set("second_unit_measure", json!(2));

        let outcome = form
            .submit(&gateway, &notifier, || refreshed.set(refreshed.get() + 1))
            .await
            .unwrap();

        assert!(matches!(outcome, SubmitOutcome::Saved(_)));
        assert_eq!(refreshed.get(), 1);
        assert!(!form.is_open());
        assert!(!form.is_submitting());

        let calls = gateway.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "unit-measures-ratios");
        assert_eq!(calls[0].1, None);
        assert_eq!(
            calls[0].2,
            json!({"ratio": 2.5, "first_unit_measure": 1, "second_unit_measure": 2})
        );
        assert_eq!(*notifier.messages.lock().unwrap(), vec!["ok:Success".to_string()]);
    }

    #[tokio::test]
    async fn test_server_errors_land_on_fields() {
        let gateway = FakeGateway {
            reject_with: Some(json!({"stir": ["supplier with this stir already exists."]})),
            ..FakeGateway::default()
        };
        let notifier = RecordingNotifier::default();
        let refreshed = Cell::new(0);
        let mut form = EntityForm::create(EntityKind::Supplier);
        for (field, value) in [
            ("company_name", json!("Acme")),
            ("stir", json!("123456789")),
            ("address", json!("Tashkent")),
            ("phone_number", json!("+998901234567")),
            ("category", json!(4)),
            ("note", json!("-")),
        ] {
            form.set(field, value);
        }

        let outcome = form
            .submit(&gateway, &notifier, || refreshed.set(refreshed.get() + 1))
            .await
            .unwrap();

        match outcome {
            SubmitOutcome::Rejected(errors) => assert_eq!(
                errors.get("stir"),
                Some("supplier with this stir already exists.")
            ),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(refreshed.get(), 0);
        assert!(form.is_open());
        assert!(!form.is_submitting());
        assert_eq!(
            notifier.messages.lock().unwrap()[0],
            "err:supplier with this stir already exists."
        );

        let body = &gateway.calls.lock().unwrap()[0].2;
        assert_eq!(body["supplier_type"], json!("legal_entity"));
        assert_eq!(body["legal_entity"], json!(1));
    }

    #[tokio::test]
    async fn test_edit_prefills_and_patches() {
        let gateway = FakeGateway {
            record: json!({
                "id": 5,
                "name": "Drinks",
                "parent": {"id": 2, "name": "Food"},
                "organizations": [{"id": 1, "name": "A"}, {"id": 3, "name": "B"}],
                "created_at": "2024-01-01"
            }),
            ..FakeGateway::default()
        };
        let notifier = RecordingNotifier::default();
        let mut form = EntityForm::edit(EntityKind::SupplierCategory, 5);

        form.load(&gateway).await.unwrap();
        assert_eq!(form.values()["parent"], json!(2));
        assert_eq!(form.values()["organizations"], json!([1, 3]));
        assert!(!form.values().contains_key("created_at"));

        form.set("parent", Value::Null);
        let refreshed = Cell::new(0);
        let outcome = form
            .submit(&gateway, &notifier, || refreshed.set(refreshed.get() + 1))
            .await
            .unwrap();
        assert!(matches!(outcome, SubmitOutcome::Saved(_)));
        assert_eq!(refreshed.get(), 1);

        let calls = gateway.calls.lock().unwrap();
        assert_eq!(calls[0].1, Some(5));
        assert_eq!(
            calls[0].2,
            json!({"name": "Drinks", "parent": null, "organizations": [1, 3]})
        );
    }

    #[tokio::test]
    async fn test_create_form_cannot_load() {
        let gateway = FakeGateway::default();
        let mut form = EntityForm::create(EntityKind::Brand);
        assert!(form.load(&gateway).await.is_err());
    }

    #[test]
    fn test_second_submit_while_in_flight_is_busy() {
        let mut form = EntityForm::create(EntityKind::Brand);
        form.set("name", json!("Nike"));

        let request = form.prepare().unwrap();
        assert_eq!(request.resource, "brands");
        assert!(form.is_submitting());
        assert_eq!(form.prepare(), Err(SubmitOutcome::Busy));

        let notifier = RecordingNotifier::default();
        let outcome = form.finish(Ok(json!({"id": 1})), &notifier, || {}).unwrap();
        assert!(matches!(outcome, SubmitOutcome::Saved(_)));
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_transport_failure_is_an_error() {
        let mut form = EntityForm::create(EntityKind::Brand);
        form.set("name", json!("Nike"));
        form.prepare().unwrap();

        let notifier = RecordingNotifier::default();
        let result = form.finish(
            Err(AdminError::ApiStatusError {
                method: "POST".to_string(),
                path: "brands".to_string(),
                status: 502,
                errors: ServerErrors::default(),
            }),
            &notifier,
            || panic!("must not refresh"),
        );
        assert!(result.is_err());
        assert!(form.is_open());
    }

    #[test]
    fn test_unauthorized_keeps_its_status() {
        let mut form = EntityForm::create(EntityKind::Brand);
        form.set("name", json!("Nike"));
        form.prepare().unwrap();

        let notifier = RecordingNotifier::default();
        let result = form.finish(
            Err(AdminError::ApiStatusError {
                method: "POST".to_string(),
                path: "brands".to_string(),
                status: 401,
                errors: ServerErrors::from_body(&json!({
                    "detail": "Authentication credentials were not provided."
                })),
            }),
            &notifier,
            || panic!("must not refresh"),
        );

        match result {
            Err(AdminError::ApiStatusError { status, .. }) => assert_eq!(status, 401),
            other => panic!("unexpected result {:?}", other),
        }
        assert!(form.errors().is_empty());
        assert!(form.is_open());
        assert!(!form.is_submitting());
    }
}
