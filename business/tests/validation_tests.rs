//! Signup validation through the public API.

use roster_business::users::{Role, SignupDraft, SignupField, validate_signup};

fn valid_draft() -> SignupDraft {
    SignupDraft {
        name: "Ada Lovelace".to_owned(),
        username: "ada".to_owned(),
        email: "ada@example.com".to_owned(),
        phone_number: "5551234567".to_owned(),
        role: "cashier".to_owned(),
        password: "longenough".to_owned(),
        password_confirmation: "longenough".to_owned(),
    }
}

mod password_tests {
    use super::*;

    #[test]
    fn test_short_password_rejected_regardless_of_other_fields() {
        for draft in [
            SignupDraft {
                password: "short".to_owned(),
                password_confirmation: "short".to_owned(),
                ..valid_draft()
            },
            SignupDraft {
                password: "short".to_owned(),
                ..SignupDraft::default()
            },
        ] {
            let errors = validate_signup(&draft).unwrap_err();
            assert!(errors.has_error(SignupField::Password));
        }
    }

    #[test]
    fn test_seven_characters_is_enough() {
        let draft = SignupDraft {
            password: "1234567".to_owned(),
            password_confirmation: "1234567".to_owned(),
            ..valid_draft()
        };
        assert!(validate_signup(&draft).is_ok());
    }

    #[test]
    fn test_mismatch_attached_to_confirmation_only() {
        let draft = SignupDraft {
            password_confirmation: "longenougH".to_owned(),
            ..valid_draft()
        };
        let errors = validate_signup(&draft).unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            [SignupField::PasswordConfirmation]
        );
        assert_eq!(
            errors.get(SignupField::PasswordConfirmation),
            ["Passwords don't match."]
        );
    }
}

mod role_tests {
    use super::*;

    #[test]
    fn test_every_known_role_accepted() {
        for role in Role::ALL {
            let draft = SignupDraft {
                role: role.to_string(),
                ..valid_draft()
            };
            assert_eq!(validate_signup(&draft).unwrap().role, role);
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        let draft = SignupDraft {
            role: "root".to_owned(),
            ..valid_draft()
        };
        let errors = validate_signup(&draft).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), [SignupField::Role]);
    }
}

mod field_tests {
    use super::*;

    #[test]
    fn test_errors_keyed_by_wire_path() {
        let errors = validate_signup(&SignupDraft::default()).unwrap_err();
        let paths: Vec<&str> = errors.fields().map(SignupField::path).collect();
        assert_eq!(
            paths,
            ["name", "username", "email", "phone_number", "role", "password"]
        );
    }

    #[test]
    fn test_invalid_email_alone() {
        let draft = SignupDraft {
            email: "ada@example".to_owned(),
            ..valid_draft()
        };
        let errors = validate_signup(&draft).unwrap_err();
        assert_eq!(errors.get(SignupField::Email), ["Invalid email address"]);
        assert!(!errors.has_error(SignupField::Name));
    }
}
