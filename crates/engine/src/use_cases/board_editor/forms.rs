//! Editor forms.
//!
//! Forms carry raw input as the editor posted it. `validate` normalizes the
//! input and either returns what should be written or every field error.
//! Forms are only borrowed, so the caller keeps the submitted values for
//! re-display.

use serde::{Deserialize, Serialize};

use cityroute_domain::{
    BoardId, CityId, NewBoard, NewCity, NewCitySpace, Position, SpaceType,
    MAX_BOARD_NAME_LENGTH, MAX_REQUIRED_PRIVILEGE, MIN_REQUIRED_PRIVILEGE,
};

use crate::use_cases::validation::{
    require_in_range, require_max_chars, require_non_blank, require_non_negative,
    require_positive, FieldErrors, ValidationError,
};

pub const FIELD_NAME: &str = "Name";
pub const FIELD_WIDTH: &str = "Width";
pub const FIELD_HEIGHT: &str = "Height";
pub const FIELD_CITY_ID: &str = "CityID";
pub const FIELD_ORDER: &str = "Order";
pub const FIELD_SPACE_TYPE: &str = "SpaceType";
pub const FIELD_REQUIRED_PRIVILEGE: &str = "RequiredPrivilege";

fn check_board_name(errors: &mut FieldErrors, name: &str) {
    // Blank names skip the length rule, so one message per problem.
    if let Err(error) = require_non_blank(name) {
        errors.add(FIELD_NAME, error);
    } else {
        errors.check(FIELD_NAME, require_max_chars(name, MAX_BOARD_NAME_LENGTH));
    }
}

fn check_dimensions(errors: &mut FieldErrors, width: i32, height: i32) {
    errors
        .check(FIELD_WIDTH, require_non_negative(width))
        .check(FIELD_HEIGHT, require_non_negative(height));
}

fn check_space(
    errors: &mut FieldErrors,
    order: Option<i32>,
    space_type: i32,
    required_privilege: i32,
) -> Option<SpaceType> {
    if let Some(order) = order {
        errors.check(FIELD_ORDER, require_positive(order));
    }
    errors.check(
        FIELD_REQUIRED_PRIVILEGE,
        require_in_range(
            required_privilege,
            MIN_REQUIRED_PRIVILEGE,
            MAX_REQUIRED_PRIVILEGE,
        ),
    );
    match SpaceType::try_from(space_type) {
        Ok(space_type) => Some(space_type),
        Err(_) => {
            errors.add(FIELD_SPACE_TYPE, ValidationError::Invalid);
            None
        }
    }
}

/// New board. Omitted or zero dimensions take the 800x500 default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
}

impl CreateBoardForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<NewBoard, FieldErrors> {
        let name = self.name.trim();
        let width = self.width.unwrap_or(0);
        let height = self.height.unwrap_or(0);

        let mut errors = FieldErrors::new();
        check_board_name(&mut errors, name);
        check_dimensions(&mut errors, width, height);
        errors.into_result()?;

        Ok(NewBoard::new(name).with_dimensions(width, height))
    }
}

/// Full board update: name and both dimensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
}

impl BoardForm {
    pub fn validate(&self) -> Result<BoardForm, FieldErrors> {
        let name = self.name.trim();

        let mut errors = FieldErrors::new();
        check_board_name(&mut errors, name);
        check_dimensions(&mut errors, self.width, self.height);
        errors.into_result()?;

        Ok(BoardForm {
            name: name.to_string(),
            width: self.width,
            height: self.height,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardNameForm {
    #[serde(default)]
    pub name: String,
}

impl BoardNameForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the trimmed name.
    pub fn validate(&self) -> Result<String, FieldErrors> {
        let name = self.name.trim();

        let mut errors = FieldErrors::new();
        check_board_name(&mut errors, name);
        errors.into_result()?;

        Ok(name.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDimensionsForm {
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
}

impl BoardDimensionsForm {
    pub fn validate(&self) -> Result<BoardDimensionsForm, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_dimensions(&mut errors, self.width, self.height);
        errors.into_result()?;
        Ok(*self)
    }
}

/// City as posted by the board editor on create or update. Any name and
/// position is accepted as long as the city belongs to a board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Position,
}

impl CityForm {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }

    pub fn validate(&self) -> Result<CityForm, FieldErrors> {
        Ok(CityForm {
            name: self.name.trim().to_string(),
            position: self.position,
        })
    }

    pub(crate) fn into_new_city(self, board_id: BoardId) -> NewCity {
        NewCity::new(board_id, self.name).with_position(self.position)
    }
}

/// New trading post slot. The owning city comes from the request path.
/// `space_type` stays a raw code so unknown values surface as a field error
/// instead of a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCitySpaceForm {
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default)]
    pub space_type: i32,
    #[serde(default)]
    pub required_privilege: i32,
}

impl AddCitySpaceForm {
    pub fn validate(&self, city_id: CityId) -> Result<NewCitySpace, FieldErrors> {
        let mut errors = FieldErrors::new();

        if city_id.is_nil() {
            errors.add(FIELD_CITY_ID, ValidationError::Required);
        }
        let space_type = check_space(
            &mut errors,
            self.order,
            self.space_type,
            self.required_privilege,
        );

        match space_type {
            Some(space_type) if errors.is_empty() => Ok(NewCitySpace {
                city_id,
                order: self.order,
                space_type,
                required_privilege: self.required_privilege,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCitySpaceForm {
    #[serde(default)]
    pub order: Option<i32>,
    #[serde(default)]
    pub space_type: i32,
    #[serde(default)]
    pub required_privilege: i32,
}

/// Validated field changes for an existing space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitySpaceChanges {
    pub order: Option<i32>,
    pub space_type: SpaceType,
    pub required_privilege: i32,
}

impl UpdateCitySpaceForm {
    pub fn validate(&self) -> Result<CitySpaceChanges, FieldErrors> {
        let mut errors = FieldErrors::new();
        let space_type = check_space(
            &mut errors,
            self.order,
            self.space_type,
            self.required_privilege,
        );

        match space_type {
            Some(space_type) if errors.is_empty() => Ok(CitySpaceChanges {
                order: self.order,
                space_type,
                required_privilege: self.required_privilege,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(errors: &FieldErrors, field: &str) -> Vec<String> {
        errors.get(field).map(<[String]>::to_vec).unwrap_or_default()
    }

    #[test]
    fn create_board_trims_and_defaults_dimensions() {
        let form = CreateBoardForm {
            name: "  Town Map ".into(),
            width: Some(0),
            height: None,
        };

        let board = form.validate().expect("valid form");

        assert_eq!(board.name, "Town Map");
        assert_eq!((board.width, board.height), (800, 500));
        // The submitted form is left as it was.
        assert_eq!(form.name, "  Town Map ");
    }

    #[test]
    fn board_name_boundary_is_one_hundred_characters() {
        let ok = BoardNameForm::new("a".repeat(100));
        assert_eq!(ok.validate().expect("100 chars").len(), 100);

        let errors = BoardNameForm::new("a".repeat(101))
            .validate()
            .expect_err("101 chars");
        assert_eq!(
            messages(&errors, FIELD_NAME),
            vec!["is too long; must be 100 characters or less"]
        );
    }

    #[test]
    fn blank_name_reports_only_blank() {
        let errors = BoardNameForm::new("   ").validate().expect_err("blank");
        assert_eq!(messages(&errors, FIELD_NAME), vec!["must not be blank"]);
    }

    #[test]
    fn full_update_collects_all_field_errors() {
        let form = BoardForm {
            name: String::new(),
            width: -1,
            height: -2,
        };

        let errors = form.validate().expect_err("invalid");

        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec![FIELD_HEIGHT, FIELD_NAME, FIELD_WIDTH]
        );
        assert_eq!(
            messages(&errors, FIELD_WIDTH),
            vec!["must be greater than or equal to zero"]
        );
    }

    #[test]
    fn dimensions_allow_zero() {
        let form = BoardDimensionsForm {
            width: 0,
            height: 0,
        };
        assert_eq!(form.validate(), Ok(form));
    }

    #[test]
    fn city_form_accepts_anything_and_trims() {
        let form = CityForm::new("  ", Position::new(-5, 99_999));
        let valid = form.validate().expect("always valid");
        assert_eq!(valid.name, "");
        assert_eq!(valid.position, Position::new(-5, 99_999));
    }

    #[test]
    fn add_space_requires_city_and_bounded_values() {
        let form = AddCitySpaceForm {
            order: Some(0),
            space_type: 3,
            required_privilege: 5,
        };

        let errors = form
            .validate(CityId::from_uuid(uuid::Uuid::nil()))
            .expect_err("invalid");

        assert_eq!(messages(&errors, FIELD_CITY_ID), vec!["is required"]);
        assert_eq!(messages(&errors, FIELD_ORDER), vec!["must be greater than zero"]);
        assert_eq!(messages(&errors, FIELD_SPACE_TYPE), vec!["is invalid"]);
        assert_eq!(
            messages(&errors, FIELD_REQUIRED_PRIVILEGE),
            vec!["is out of bounds (must be between 1 and 4)"]
        );
    }

    #[test]
    fn add_space_builds_draft() {
        let city_id = CityId::new();
        let form = AddCitySpaceForm {
            order: None,
            space_type: 2,
            required_privilege: 4,
        };

        let space = form.validate(city_id).expect("valid");

        assert_eq!(space.city_id, city_id);
        assert_eq!(space.order, None);
        assert_eq!(space.space_type, SpaceType::Merchant);
        assert_eq!(space.required_privilege, 4);
    }

    #[test]
    fn update_space_applies_same_rules() {
        let errors = UpdateCitySpaceForm {
            order: Some(-1),
            space_type: 0,
            required_privilege: 0,
        }
        .validate()
        .expect_err("invalid");
        assert_eq!(errors.fields().count(), 3);

        let changes = UpdateCitySpaceForm {
            order: Some(2),
            space_type: 1,
            required_privilege: 3,
        }
        .validate()
        .expect("valid");
        assert_eq!(changes.space_type, SpaceType::Trader);
        assert_eq!(changes.order, Some(2));
    }

    #[test]
    fn forms_decode_camel_case_json() {
        let form: AddCitySpaceForm = serde_json::from_str(
            r#"{"spaceType": 1, "requiredPrivilege": 2, "order": 3}"#,
        )
        .expect("decode");
        assert_eq!(form.space_type, 1);
        assert_eq!(form.required_privilege, 2);
        assert_eq!(form.order, Some(3));
    }
}
