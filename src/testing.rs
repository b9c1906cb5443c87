//! Stand-in S3 endpoint for tests, served by `wiremock`.

use wiremock::matchers::{method, path, path_regex, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::clapargs::TransferRequest;

pub const BUCKET: &str = "data-bucket";
pub const A_CSV: &str = "id,name\n1,alpha\n";
pub const B_CSV: &str = "id,name\n2,beta\n";

const BUCKET_PATH: &str = r"^/data-bucket/?$";

fn list_result(keys: &[&str], next_token: Option<&str>) -> String {
    let contents: String = keys
        .iter()
        .map(|k| format!("<Contents><Key>{k}</Key><Size>1</Size></Contents>"))
        .collect();
    let truncation = match next_token {
        Some(token) => format!(
            "<IsTruncated>true</IsTruncated><NextContinuationToken>{token}</NextContinuationToken>"
        ),
        None => "<IsTruncated>false</IsTruncated>".to_string(),
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/"><Name>{BUCKET}</Name><Prefix>exports</Prefix><KeyCount>{}</KeyCount><MaxKeys>2</MaxKeys>{truncation}{contents}</ListBucketResult>"#,
        keys.len()
    )
}

fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/xml")
}

/// `exports/` listed over two pages: the directory marker and `a.csv` on
/// the first (truncated, token `page-2`), `b.csv` on the second. The second
/// page only answers when the token is sent back.
pub async fn mount_exports(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(BUCKET_PATH))
        .and(query_param("list-type", "2"))
        .and(query_param("prefix", "exports"))
        .and(query_param_is_missing("continuation-token"))
        .respond_with(xml(list_result(
            &["exports/", "exports/a.csv"],
            Some("page-2"),
        )))
        // A client that forgets the token gets a 404 instead of page one forever
        .up_to_n_times(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(BUCKET_PATH))
        .and(query_param("list-type", "2"))
        .and(query_param("continuation-token", "page-2"))
        .respond_with(xml(list_result(&["exports/b.csv"], None)))
        .mount(server)
        .await;

    for (key, body) in [("exports/a.csv", A_CSV), ("exports/b.csv", B_CSV)] {
        Mock::given(method("GET"))
            .and(path(format!("/{BUCKET}/{key}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body, "application/octet-stream"),
            )
            .mount(server)
            .await;
    }
}

/// Every listing is refused the way S3 refuses an unknown access key.
pub async fn mount_rejected_credentials(server: &MockServer) {
    let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>InvalidAccessKeyId</Code><Message>The AWS Access Key Id you provided does not exist in our records.</Message></Error>"#;
    Mock::given(method("GET"))
        .and(path_regex(BUCKET_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_raw(body, "application/xml"))
        .mount(server)
        .await;
}

/// A request aimed at `server` with a fixed region, so no ambient AWS
/// configuration is consulted.
pub fn request_for(server: &MockServer, local_path: std::path::PathBuf) -> TransferRequest {
    TransferRequest {
        local_path,
        bucket: BUCKET.to_string(),
        prefix: "exports".to_string(),
        access_key: "AKIDEXAMPLE".to_string(),
        secret_key: "s3cr3t".to_string(),
        region: Some("us-east-1".to_string()),
        endpoint_url: Some(server.uri()),
    }
}
