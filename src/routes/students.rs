use crate::{
    data::{
        NewStudent, Page, Student, StudentStore,
        student::{StudentForm, loose_int},
    },
    error::{
        NoChangesMadeSnafu, NoIdProvidedSnafu, ParseQuerySnafu, StudentNotFoundSnafu,
        StudentsError, StudentsResult,
    },
    state::StudentsState,
};
use axum::{
    Json,
    body::Bytes,
    extract::{FromRequestParts, State},
    http::request::Parts,
};
use serde::Serialize;
use snafu::{OptionExt, ResultExt};

/// Query string of `GET` and `DELETE`. Numbers stay as text until [`loose_int`] reads them.
///
/// A repeated key keeps its last value, unknown keys are ignored.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StudentQuery {
    pub id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl StudentQuery {
    pub fn parse(raw: &str) -> StudentsResult<Self> {
        let pairs: Vec<(String, String)> =
            serde_html_form::from_str(raw).context(ParseQuerySnafu)?;

        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "id" => query.id = Some(value),
                "page" => query.page = Some(value),
                "limit" => query.limit = Some(value),
                _ => {}
            }
        }
        Ok(query)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for StudentQuery {
    type Rejection = StudentsError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::parse(parts.uri.query().unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListStudents {
    pub page: Page,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetStudent {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStudent {
    pub id: i64,
    pub replacement: NewStudent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteStudent {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentCommand {
    List(ListStudents),
    Get(GetStudent),
    Create(NewStudent),
    Update(UpdateStudent),
    Delete(DeleteStudent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StudentReply {
    Record(Student),
    Records(Vec<Student>),
    Success {
        status: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        student: Option<Student>,
    },
}

impl StudentReply {
    const fn success(student: Option<Student>) -> Self {
        Self::Success {
            status: "success",
            student,
        }
    }
}

impl StudentCommand {
    /// A `GET` with an `id` fetches one record, otherwise it lists a page.
    pub fn from_query(query: StudentQuery) -> Self {
        let StudentQuery { id, page, limit } = query;

        if let Some(id) = id {
            return Self::Get(GetStudent { id: loose_int(&id) });
        }

        let page = page.as_deref().map_or(Page::DEFAULT_PAGE, loose_int);
        let limit = limit.as_deref().map_or(Page::DEFAULT_LIMIT, loose_int);
        Self::List(ListStudents {
            page: Page::new(page, limit),
        })
    }

    pub fn create(body: &[u8], label_numeric_years: bool) -> StudentsResult<Self> {
        StudentForm::from_body(body)
            .validate(label_numeric_years)
            .map(Self::Create)
    }

    /// The id isn't validated, a missing one becomes `0` and matches nothing.
    pub fn update(body: &[u8], label_numeric_years: bool) -> StudentsResult<Self> {
        let form = StudentForm::from_body(body);
        let id = form.id();
        let replacement = form.validate(label_numeric_years)?;

        Ok(Self::Update(UpdateStudent { id, replacement }))
    }

    pub fn delete(query: StudentQuery) -> StudentsResult<Self> {
        let id = query.id.context(NoIdProvidedSnafu)?;
        Ok(Self::Delete(DeleteStudent { id: loose_int(&id) }))
    }

    pub async fn execute<S: StudentStore>(self, store: &S) -> StudentsResult<StudentReply> {
        match self {
            Self::List(ListStudents { page }) => {
                debug!(?page, "Listing students");
                store.get_page(page).await.map(StudentReply::Records)
            }
            Self::Get(GetStudent { id }) => {
                debug!(?id, "Fetching student");
                store
                    .get_by_id(id)
                    .await?
                    .context(StudentNotFoundSnafu { id })
                    .map(StudentReply::Record)
            }
            Self::Create(to_be_added) => {
                let student = store.insert(to_be_added).await?;
                info!(id = student.id, "Created student");
                Ok(StudentReply::success(Some(student)))
            }
            Self::Update(UpdateStudent { id, replacement }) => {
                let student = store
                    .update(id, replacement)
                    .await?
                    .context(NoChangesMadeSnafu { id })?;
                info!(?id, "Updated student");
                Ok(StudentReply::success(Some(student)))
            }
            Self::Delete(DeleteStudent { id }) => {
                if !store.remove(id).await? {
                    return StudentNotFoundSnafu { id }.fail();
                }
                info!(?id, "Deleted student");
                Ok(StudentReply::success(None))
            }
        }
    }
}

pub async fn get_students<S: StudentStore>(
    State(state): State<StudentsState<S>>,
    query: StudentQuery,
) -> StudentsResult<Json<StudentReply>> {
    StudentCommand::from_query(query)
        .execute(&*state)
        .await
        .map(Json)
}

pub async fn post_student<S: StudentStore>(
    State(state): State<StudentsState<S>>,
    body: Bytes,
) -> StudentsResult<Json<StudentReply>> {
    StudentCommand::create(&body, state.label_numeric_years())?
        .execute(&*state)
        .await
        .map(Json)
}

pub async fn put_student<S: StudentStore>(
    State(state): State<StudentsState<S>>,
    body: Bytes,
) -> StudentsResult<Json<StudentReply>> {
    StudentCommand::update(&body, state.label_numeric_years())?
        .execute(&*state)
        .await
        .map(Json)
}

pub async fn delete_student<S: StudentStore>(
    State(state): State<StudentsState<S>>,
    query: StudentQuery,
) -> StudentsResult<Json<StudentReply>> {
    StudentCommand::delete(query)?
        .execute(&*state)
        .await
        .map(Json)
}
