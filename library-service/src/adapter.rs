use async_trait::async_trait;
use futures::{
    StreamExt, future,
    stream::{self, BoxStream},
};
use library_api::{
    model::{
        author_service::{
            ParsedChangeAuthorInfoRequest, ParsedGetAuthorBooksRequest,
            ParsedGetAuthorInfoRequest, ParsedRegisterAuthorRequest,
        },
        book::BookModel,
        book_service::{ParsedAddBookRequest, ParsedGetBookInfoRequest, ParsedUpdateBookRequest},
        parse::RequestParse,
    },
    v1::{
        AddBookRequest, AddBookResponse, Book, ChangeAuthorInfoRequest, ChangeAuthorInfoResponse,
        GetAuthorBooksRequest, GetAuthorInfoRequest, GetAuthorInfoResponse, GetBookInfoRequest,
        GetBookInfoResponse, RegisterAuthorRequest, RegisterAuthorResponse, UpdateBookRequest,
        UpdateBookResponse, library_server::Library,
    },
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};
use tracing::{Instrument, Span, info, warn};

use crate::catalog::Catalog;

/// Capacity of the channel between the send loop and the response stream.
const BOOK_STREAM_CAPACITY: usize = 1;

/// gRPC service adapter for the `library.Library` service.
#[derive(Debug, Clone)]
pub struct LibraryAdapter {
    catalog: Catalog,
}

/// Destination of a book stream.
#[async_trait]
pub trait BookSink: Send {
    type Error: Send;

    /// Delivers one book.
    ///
    /// # Errors
    ///
    /// Returns an error if the book could not be delivered.
    async fn send_book(&mut self, book: Book) -> Result<(), Self::Error>;
}

#[async_trait]
impl BookSink for mpsc::Sender<Result<Book, Status>> {
    type Error = Status;

    async fn send_book(&mut self, book: Book) -> Result<(), Status> {
        self.send(Ok(book))
            .await
            .map_err(|_| Status::cancelled("book stream closed by receiver"))
    }
}

/// Sends books in order and stops at the first failed send.
///
/// Returns the number of delivered books.
///
/// # Errors
///
/// Returns the sink's error as is.
pub async fn send_books<S: BookSink>(
    books: Vec<BookModel>,
    sink: &mut S,
) -> Result<usize, S::Error> {
    let mut sent = 0;
    for book in books {
        sink.send_book(book.into()).await?;
        sent += 1;
    }
    Ok(sent)
}

impl LibraryAdapter {
    pub fn new(catalog: Catalog) -> Self {
        LibraryAdapter { catalog }
    }
}

#[tonic::async_trait]
impl Library for LibraryAdapter {
    type GetAuthorBooksStream = BoxStream<'static, Result<Book, Status>>;

    #[tracing::instrument(skip(self))]
    async fn add_book(
        &self,
        request: Request<AddBookRequest>,
    ) -> Result<Response<AddBookResponse>, Status> {
        let request = ParsedAddBookRequest::parse(request.into_inner())?;

        let book = self
            .catalog
            .add_book(&request.name, &request.author_ids)
            .await?;

        Ok(Response::new(AddBookResponse {
            book: Some(book.into()),
        }))
    }

    #[tracing::instrument(skip(self))]
    async fn update_book(
        &self,
        request: Request<UpdateBookRequest>,
    ) -> Result<Response<UpdateBookResponse>, Status> {
        let request = ParsedUpdateBookRequest::parse(request.into_inner())?;

        self.catalog
            .update_book(request.id, &request.name, &request.author_ids)
            .await?;

        Ok(Response::new(UpdateBookResponse {}))
    }

    #[tracing::instrument(skip(self))]
    async fn get_book_info(
        &self,
        request: Request<GetBookInfoRequest>,
    ) -> Result<Response<GetBookInfoResponse>, Status> {
        let request = ParsedGetBookInfoRequest::parse(request.into_inner())?;

        let book = self.catalog.get_book_info(request.id).await?;

        Ok(Response::new(GetBookInfoResponse {
            book: Some(book.into()),
        }))
    }

    #[tracing::instrument(skip(self))]
    async fn register_author(
        &self,
        request: Request<RegisterAuthorRequest>,
    ) -> Result<Response<RegisterAuthorResponse>, Status> {
        let request = ParsedRegisterAuthorRequest::parse(request.into_inner())?;

        let author = self.catalog.register_author(&request.name).await?;

        Ok(Response::new(RegisterAuthorResponse {
            id: author.id.to_string(),
        }))
    }

    #[tracing::instrument(skip(self))]
    async fn change_author_info(
        &self,
        request: Request<ChangeAuthorInfoRequest>,
    ) -> Result<Response<ChangeAuthorInfoResponse>, Status> {
        let request = ParsedChangeAuthorInfoRequest::parse(request.into_inner())?;

        self.catalog
            .change_author_info(request.id, &request.name)
            .await?;

        Ok(Response::new(ChangeAuthorInfoResponse {}))
    }

    #[tracing::instrument(skip(self))]
    async fn get_author_info(
        &self,
        request: Request<GetAuthorInfoRequest>,
    ) -> Result<Response<GetAuthorInfoResponse>, Status> {
        let request = ParsedGetAuthorInfoRequest::parse(request.into_inner())?;

        let author = self.catalog.get_author_info(request.id).await?;

        Ok(Response::new(author.into()))
    }

    /// Streams the author's books.
    ///
    /// The send loop is polled as part of the response stream, so it ends
    /// with the stream and outlives neither the call nor the client.
    #[tracing::instrument(skip(self))]
    async fn get_author_books(
        &self,
        request: Request<GetAuthorBooksRequest>,
    ) -> Result<Response<Self::GetAuthorBooksStream>, Status> {
        let request = ParsedGetAuthorBooksRequest::parse(request.into_inner())?;

        let books = self.catalog.get_author_books(request.author_id).await?;

        let (mut sender, receiver) = mpsc::channel(BOOK_STREAM_CAPACITY);
        let send_loop = async move {
            let total = books.len();
            match send_books(books, &mut sender).await {
                Ok(sent) => info!(sent, "sent author books"),
                Err(status) => warn!(total, %status, "failed to send author books"),
            }
        }
        .instrument(Span::current());

        let stream = stream::select(
            ReceiverStream::new(receiver),
            stream::once(send_loop).filter_map(|()| future::ready(None::<Result<Book, Status>>)),
        );

        Ok(Response::new(stream.boxed()))
    }
}
