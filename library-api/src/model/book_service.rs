use crate::{
    model::{
        author::AuthorId,
        book::BookId,
        parse::{
            RequestError, RequestParse, RequestResult, RequestValidator, parse_book_name,
            parse_id, parse_ids,
        },
    },
    v1::{AddBookRequest, GetBookInfoRequest, UpdateBookRequest},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddBookRequest {
    pub name: String,
    pub author_ids: Vec<AuthorId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUpdateBookRequest {
    pub id: BookId,
    pub name: String,
    pub author_ids: Vec<AuthorId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedGetBookInfoRequest {
    pub id: BookId,
}

impl RequestParse<AddBookRequest> for ParsedAddBookRequest {
    type Error = RequestError;

    fn parse(request: AddBookRequest) -> RequestResult<Self> {
        let mut validator = RequestValidator::new("AddBook");
        let name = validator.field(parse_book_name("name", request.name));
        let author_ids = validator.fields(parse_ids("author_ids", &request.author_ids));
        match (name, author_ids) {
            (Some(name), Some(author_ids)) => Ok(Self { name, author_ids }),
            _ => Err(validator.into_error()),
        }
    }
}

impl RequestParse<UpdateBookRequest> for ParsedUpdateBookRequest {
    type Error = RequestError;

    fn parse(request: UpdateBookRequest) -> RequestResult<Self> {
        let mut validator = RequestValidator::new("UpdateBook");
        let id = validator.field(parse_id("id", &request.id));
        let name = validator.field(parse_book_name("name", request.name));
        let author_ids = validator.fields(parse_ids("author_ids", &request.author_ids));
        match (id, name, author_ids) {
            (Some(id), Some(name), Some(author_ids)) => Ok(Self {
                id,
                name,
                author_ids,
            }),
            _ => Err(validator.into_error()),
        }
    }
}

impl RequestParse<GetBookInfoRequest> for ParsedGetBookInfoRequest {
    type Error = RequestError;

    fn parse(request: GetBookInfoRequest) -> RequestResult<Self> {
        let id = parse_id("id", &request.id)
            .map_err(|err| RequestError::from(err).wrap_request("GetBookInfo"))?;
        Ok(Self { id })
    }
}
