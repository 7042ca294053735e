use crate::{
    model::{
        author::AuthorId,
        parse::{
            RequestError, RequestParse, RequestResult, RequestValidator, parse_author_name,
            parse_id,
        },
    },
    v1::{
        ChangeAuthorInfoRequest, GetAuthorBooksRequest, GetAuthorInfoRequest,
        RegisterAuthorRequest,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRegisterAuthorRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedChangeAuthorInfoRequest {
    pub id: AuthorId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedGetAuthorInfoRequest {
    pub id: AuthorId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedGetAuthorBooksRequest {
    pub author_id: AuthorId,
}

impl RequestParse<RegisterAuthorRequest> for ParsedRegisterAuthorRequest {
    type Error = RequestError;

    fn parse(request: RegisterAuthorRequest) -> RequestResult<Self> {
        let name = parse_author_name("name", request.name)
            .map_err(|err| RequestError::from(err).wrap_request("RegisterAuthor"))?;
        Ok(Self { name })
    }
}

impl RequestParse<ChangeAuthorInfoRequest> for ParsedChangeAuthorInfoRequest {
    type Error = RequestError;

    fn parse(request: ChangeAuthorInfoRequest) -> RequestResult<Self> {
        let mut validator = RequestValidator::new("ChangeAuthorInfo");
        let id = validator.field(parse_id("id", &request.id));
        let name = validator.field(parse_author_name("name", request.name));
        match (id, name) {
            (Some(id), Some(name)) => Ok(Self { id, name }),
            _ => Err(validator.into_error()),
        }
    }
}

impl RequestParse<GetAuthorInfoRequest> for ParsedGetAuthorInfoRequest {
    type Error = RequestError;

    fn parse(request: GetAuthorInfoRequest) -> RequestResult<Self> {
        let id = parse_id("id", &request.id)
            .map_err(|err| RequestError::from(err).wrap_request("GetAuthorInfo"))?;
        Ok(Self { id })
    }
}

impl RequestParse<GetAuthorBooksRequest> for ParsedGetAuthorBooksRequest {
    type Error = RequestError;

    fn parse(request: GetAuthorBooksRequest) -> RequestResult<Self> {
        let author_id = parse_id("author_id", &request.author_id).map_err(|err| {
            RequestError::from(err).wrap_request("GetAuthorBooks")
        })?;
        Ok(Self { author_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse::{CommonError, FieldError};

    #[test]
    fn register_author() {
        assert_eq!(
            ParsedRegisterAuthorRequest::parse(RegisterAuthorRequest {
                name: "Alice".into(),
            })
            .unwrap(),
            ParsedRegisterAuthorRequest {
                name: "Alice".into(),
            }
        );

        let err = ParsedRegisterAuthorRequest::parse(RegisterAuthorRequest { name: "@".into() })
            .unwrap_err();
        assert_eq!(
            err,
            RequestError::bad_request(
                "RegisterAuthor",
                [FieldError::new("name", CommonError::InvalidCharacters)]
            )
        );
    }

    #[test]
    fn change_author_info_collects_violations() {
        let err = ParsedChangeAuthorInfoRequest::parse(ChangeAuthorInfoRequest {
            id: "not uuid".into(),
            name: "a".repeat(1000),
        })
        .unwrap_err();
        assert_eq!(err.violations().len(), 2);
        assert_eq!(err.violations()[0].field, "id");
        assert_eq!(err.violations()[1].field, "name");
    }

    #[test]
    fn get_author_books() {
        let author_id = AuthorId::generate();
        assert_eq!(
            ParsedGetAuthorBooksRequest::parse(GetAuthorBooksRequest {
                author_id: author_id.to_string(),
            })
            .unwrap()
            .author_id,
            author_id
        );
        assert!(
            ParsedGetAuthorBooksRequest::parse(GetAuthorBooksRequest {
                author_id: "not-uuid".into(),
            })
            .is_err()
        );
    }
}
