//! Operation handler bridging the HTTP layer to the filesystem gateway.
//!
//! Implements [`GatewayHandler`] by delegating each routed operation to the
//! corresponding [`Gateway`] method and rendering the result: listings as
//! `ListBucketResult` XML, object reads as raw content with an `ETag`,
//! writes as empty 200s, deletes as empty 204s.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http::StatusCode;
use md5::{Digest, Md5};

use bucketfs_core::Gateway;
use bucketfs_http::body::GatewayBody;
use bucketfs_http::dispatch::{GatewayHandler, RoutedRequest};
use bucketfs_http::response::{empty_response, object_response, xml_response};
use bucketfs_model::{GatewayError, GatewayOperation, ListObjectsQuery};
use bucketfs_xml::{ListBucketResult, to_xml};

/// Wrapper implementing [`GatewayHandler`] over the filesystem [`Gateway`].
#[derive(Debug, Clone)]
pub struct FsHandler(pub Gateway);

impl GatewayHandler for FsHandler {
    fn handle_operation(
        &self,
        routed: RoutedRequest,
        _parts: http::request::Parts,
        body: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<http::Response<GatewayBody>, GatewayError>> + Send>>
    {
        let gateway = self.0.clone();
        Box::pin(async move {
            let bucket = routed.address.bucket.as_str();
            let key = routed.address.key.as_str();

            match routed.operation {
                GatewayOperation::ListObjects => {
                    let query = ListObjectsQuery::from_params(&routed.query);
                    let listing = gateway.list_objects(bucket, query.clone()).await?;
                    let doc = ListBucketResult {
                        name: bucket,
                        prefix: &query.prefix,
                        delimiter: &query.delimiter,
                        listing: &listing,
                    };
                    let xml = to_xml("ListBucketResult", &doc).map_err(|e| {
                        GatewayError::internal(format!("failed to serialize listing: {e}"))
                    })?;
                    Ok(xml_response(xml))
                }
                GatewayOperation::GetObject => {
                    let data = gateway.get_object(bucket, key).await?;
                    let etag = hex::encode(Md5::digest(&data));
                    Ok(object_response(data, &etag))
                }
                GatewayOperation::PutObject => {
                    let put = gateway.put_object(bucket, key, body).await?;
                    http::Response::builder()
                        .status(StatusCode::OK)
                        .header("ETag", format!("\"{}\"", put.etag))
                        .body(GatewayBody::empty())
                        .map_err(|e| {
                            GatewayError::internal(format!("failed to build response: {e}"))
                        })
                }
                GatewayOperation::CreatePrefix => {
                    gateway.create_prefix(bucket, key).await?;
                    Ok(empty_response(StatusCode::OK))
                }
                GatewayOperation::DeleteObject => {
                    gateway.delete_object(bucket, key).await?;
                    Ok(empty_response(StatusCode::NO_CONTENT))
                }
                GatewayOperation::DeletePrefix => {
                    gateway.delete_prefix(bucket, key).await?;
                    Ok(empty_response(StatusCode::NO_CONTENT))
                }
            }
        })
    }
}
