use crudlayer::validation::validators::{validate_length, validate_required};
use crudlayer::{
    FieldCopyConverter, Identifiable, SeaOrmRepository, Validatable, ValidationErrors,
    ValidationProfile,
};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::IntoActiveModel;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub body: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub type NoteRepository = SeaOrmRepository<Note, ActiveModel>;

/// Application-side note; every field is optional so it doubles as a patch
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Option<i32>,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl Note {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }
}

impl From<Model> for Note {
    fn from(model: Model) -> Self {
        Self {
            id: Some(model.id),
            title: Some(model.title),
            body: model.body,
        }
    }
}

impl IntoActiveModel<ActiveModel> for Note {
    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: self.id.map_or(NotSet, Set),
            title: self.title.map_or(NotSet, Set),
            body: Set(self.body),
        }
    }
}

impl Identifiable for Note {
    type Id = i32;

    fn id(&self) -> Option<i32> {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = Some(id);
    }
}

impl Validatable for Note {
    fn validate(&self, profile: ValidationProfile) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match profile {
            ValidationProfile::Create | ValidationProfile::Update => {
                errors.check(validate_required("title", self.title.as_deref()));
            }
            ValidationProfile::Patch | ValidationProfile::Delete => {}
        }
        if let Some(title) = &self.title {
            errors.check(validate_length("title", title, Some(1), Some(100)));
        }
        errors.result()
    }
}

/// Transport shape of a note: same fields, body exposed as `content`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteDto {
    pub id: Option<i32>,
    pub title: Option<String>,
    #[serde(rename = "body")]
    pub content: Option<String>,
}

pub type NoteDtoConverter = FieldCopyConverter<NoteDto, Note>;
