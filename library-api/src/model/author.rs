use uuid::Uuid;

use crate::v1::GetAuthorInfoResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AuthorId(pub Uuid);

impl_uuid_id!(AuthorId);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorModel {
    pub id: AuthorId,
    pub name: String,
}

impl From<AuthorModel> for GetAuthorInfoResponse {
    fn from(author: AuthorModel) -> Self {
        Self {
            id: author.id.to_string(),
            name: author.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse::CommonError;

    #[test]
    fn parse_and_display() {
        let id: AuthorId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
        assert_eq!(id.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
        assert_eq!(
            "67E55044-10B1-426F-9247-BB680E5FE0C8"
                .parse::<AuthorId>()
                .unwrap(),
            id
        );
    }

    #[test]
    fn reject_invalid() {
        assert_eq!("".parse::<AuthorId>(), Err(CommonError::InvalidId));
        assert_eq!("not-uuid".parse::<AuthorId>(), Err(CommonError::InvalidId));
        assert_eq!(
            "67e55044-10b1-426f-9247".parse::<AuthorId>(),
            Err(CommonError::InvalidId)
        );
    }
}
