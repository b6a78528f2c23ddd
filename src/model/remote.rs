// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/remote.rs - 远程目标检测服务
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::marker::PhantomData;
use std::time::Duration;

use reqwest::blocking::{Client, multipart};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
  FromUrl,
  input::AsUpload,
  model::{LabelsResponse, Model, ModelLabel, PredictResponse, Prediction},
};

const PREDICT_PATH: &str = "model/predict";
const LABELS_PATH: &str = "model/labels";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
// 过滤在本地完成，服务端阈值固定为 0
const SERVER_THRESHOLD: &str = "0";

#[derive(Error, Debug)]
pub enum ClientError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("URL 错误: {0}")]
  Url(#[from] url::ParseError),
  #[error("请求错误: {0}")]
  Request(#[from] reqwest::Error),
  #[error("HTTP 状态 {0}: {1}")]
  Http(u16, String),
  #[error("响应解析错误: {0}")]
  Decode(#[from] serde_json::Error),
  #[error("服务返回状态: {0}")]
  Status(String),
}

pub struct RemoteDetectorBuilder {
  base: Url,
  timeout: Duration,
}

impl FromUrl for RemoteDetectorBuilder {
  type Error = ClientError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      "http" | "https" => Ok(RemoteDetectorBuilder {
        base: url.clone(),
        timeout: DEFAULT_TIMEOUT,
      }),
      other => Err(ClientError::SchemeMismatch(format!(
        "服务地址必须使用 http 或 https 方案, 实际为 '{}'",
        other
      ))),
    }
  }
}

impl RemoteDetectorBuilder {
  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn build<Frame>(self) -> Result<RemoteDetector<Frame>, ClientError> {
    let predict_url = endpoint(&self.base, PREDICT_PATH)?;
    let labels_url = endpoint(&self.base, LABELS_PATH)?;
    info!("检测服务地址: {}", predict_url);

    let client = Client::builder().timeout(self.timeout).build()?;

    Ok(RemoteDetector {
      client,
      predict_url,
      labels_url,
      _phantom: PhantomData,
    })
  }
}

pub struct RemoteDetector<Frame> {
  client: Client,
  predict_url: Url,
  labels_url: Url,
  _phantom: PhantomData<Frame>,
}

impl<Frame> RemoteDetector<Frame> {
  pub fn predict_url(&self) -> &Url {
    &self.predict_url
  }

  /// 查询模型支持的类别
  pub fn labels(&self) -> Result<Vec<ModelLabel>, ClientError> {
    debug!("请求类别列表: {}", self.labels_url);
    let response = self.client.get(self.labels_url.clone()).send()?;
    let body = read_body(response)?;
    let labels: LabelsResponse = serde_json::from_str(&body)?;
    if labels.count != labels.labels.len() {
      warn!(
        "类别数量不一致: count = {}, 实际 {}",
        labels.count,
        labels.labels.len()
      );
    }
    Ok(labels.labels)
  }

  fn predict_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<Vec<Prediction>, ClientError> {
    let form = multipart::Form::new()
      .part(
        "image",
        multipart::Part::bytes(bytes.to_vec()).file_name(file_name.to_string()),
      )
      .text("threshold", SERVER_THRESHOLD);

    debug!("上传图像 {} ({} 字节)", file_name, bytes.len());
    let response = self
      .client
      .post(self.predict_url.clone())
      .multipart(form)
      .send()?;
    let body = read_body(response)?;
    decode_predictions(&body)
  }
}

impl<Frame: AsUpload> Model for RemoteDetector<Frame> {
  type Input = Frame;
  type Output = Vec<Prediction>;
  type Error = ClientError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    self.predict_bytes(input.file_name(), input.upload_bytes())
  }
}

fn read_body(response: reqwest::blocking::Response) -> Result<String, ClientError> {
  let status = response.status();
  if !status.is_success() {
    let reason = status.canonical_reason().unwrap_or("unknown").to_string();
    return Err(ClientError::Http(status.as_u16(), reason));
  }
  Ok(response.text()?)
}

pub(crate) fn decode_predictions(body: &str) -> Result<Vec<Prediction>, ClientError> {
  let response: PredictResponse = serde_json::from_str(body)?;
  if !response.is_ok() {
    return Err(ClientError::Status(response.status));
  }
  Ok(response.predictions)
}

// 基础地址可能带路径前缀，拼接前补全末尾的 `/`
fn endpoint(base: &Url, path: &str) -> Result<Url, url::ParseError> {
  let mut base = base.clone();
  if !base.path().ends_with('/') {
    let path = format!("{}/", base.path());
    base.set_path(&path);
  }
  base.join(path)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::input::DisplayImage;
  use std::io::{Cursor, Read, Write};
  use std::net::{TcpListener, TcpStream};
  use std::thread;

  // 单次应答的本地服务，返回服务地址和收到的原始请求
  fn serve_once(status: &'static str, body: &'static str) -> (Url, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
    let handle = thread::spawn(move || {
      let (mut stream, _) = listener.accept().unwrap();
      let request = read_request(&mut stream);
      let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
      );
      stream.write_all(response.as_bytes()).unwrap();
      request
    });
    (url, handle)
  }

  fn read_request(stream: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !request_complete(&data) {
      let n = stream.read(&mut buf).unwrap();
      if n == 0 {
        break;
      }
      data.extend_from_slice(&buf[..n]);
    }
    String::from_utf8_lossy(&data).into_owned()
  }

  fn request_complete(data: &[u8]) -> bool {
    let Some(end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
      return false;
    };
    let headers = String::from_utf8_lossy(&data[..end]).to_ascii_lowercase();
    let length = headers
      .lines()
      .find_map(|line| line.strip_prefix("content-length:"))
      .and_then(|value| value.trim().parse::<usize>().ok());
    match length {
      Some(length) => data.len() >= end + 4 + length,
      None if headers.contains("transfer-encoding: chunked") => data.ends_with(b"0\r\n\r\n"),
      None => true,
    }
  }

  fn cat_image() -> DisplayImage {
    let image = image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3]));
    let mut bytes = Vec::new();
    image
      .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
      .unwrap();
    DisplayImage::from_bytes("cat.png", bytes).unwrap()
  }

  fn detector(url: &Url) -> RemoteDetector<DisplayImage> {
    RemoteDetectorBuilder::from_url(url)
      .unwrap()
      .timeout(Duration::from_secs(5))
      .build()
      .unwrap()
  }

  #[test]
  fn infer_posts_multipart_with_zero_threshold() {
    let (url, server) = serve_once(
      "200 OK",
      r#"{"status": "ok", "predictions": [
        {"label_id": "17", "label": "cat", "probability": 0.92, "detection_box": [0.1, 0.2, 0.5, 0.6]}
      ]}"#,
    );
    let predictions = detector(&url).infer(&cat_image()).unwrap();
    let request = server.join().unwrap();

    assert!(request.starts_with("POST /model/predict HTTP/1.1\r\n"), "{}", request);
    assert!(request.to_ascii_lowercase().contains("content-type: multipart/form-data"));
    assert!(request.contains(r#"name="image"; filename="cat.png""#));
    assert!(request.contains("name=\"threshold\"\r\n\r\n0\r\n"));
    assert!(request.contains("PNG"));

    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0].label, "cat");
    assert_eq!(predictions[0].label_id.as_deref(), Some("17"));
  }

  #[test]
  fn server_error_status_is_http_error() {
    let (url, server) = serve_once("500 Internal Server Error", r#"{"status": "error"}"#);
    let err = detector(&url).infer(&cat_image()).unwrap_err();
    server.join().unwrap();
    assert!(matches!(err, ClientError::Http(500, _)), "{:?}", err);
  }

  #[test]
  fn labels_uses_get() {
    let (url, server) = serve_once(
      "200 OK",
      r#"{"status": "ok", "count": 2, "labels": [
        {"id": "1", "name": "person"}, {"id": "17", "name": "cat"}
      ]}"#,
    );
    let labels = detector(&url).labels().unwrap();
    let request = server.join().unwrap();

    assert!(request.starts_with("GET /model/labels HTTP/1.1\r\n"), "{}", request);
    let names: Vec<_> = labels.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["person", "cat"]);
  }

  #[test]
  fn endpoint_on_bare_host() {
    let base = Url::parse("http://localhost:5000").unwrap();
    assert_eq!(
      endpoint(&base, PREDICT_PATH).unwrap().as_str(),
      "http://localhost:5000/model/predict"
    );
  }

  #[test]
  fn endpoint_keeps_path_prefix() {
    let base = Url::parse("https://example.com/max").unwrap();
    assert_eq!(
      endpoint(&base, LABELS_PATH).unwrap().as_str(),
      "https://example.com/max/model/labels"
    );

    let base = Url::parse("https://example.com/max/").unwrap();
    assert_eq!(
      endpoint(&base, PREDICT_PATH).unwrap().as_str(),
      "https://example.com/max/model/predict"
    );
  }

  #[test]
  fn rejects_non_http_scheme() {
    let url = Url::parse("image:///tmp/a.png").unwrap();
    assert!(matches!(
      RemoteDetectorBuilder::from_url(&url),
      Err(ClientError::SchemeMismatch(_))
    ));
  }

  #[test]
  fn builds_predict_url() {
    let url = Url::parse("http://127.0.0.1:5000").unwrap();
    let detector: RemoteDetector<DisplayImage> =
      RemoteDetectorBuilder::from_url(&url).unwrap().build().unwrap();
    assert_eq!(
      detector.predict_url().as_str(),
      "http://127.0.0.1:5000/model/predict"
    );
  }

  #[test]
  fn decode_rejects_error_status() {
    let err = decode_predictions(r#"{"status": "error", "predictions": []}"#).unwrap_err();
    assert!(matches!(err, ClientError::Status(s) if s == "error"));
  }

  #[test]
  fn decode_rejects_garbage() {
    assert!(matches!(
      decode_predictions("<html>"),
      Err(ClientError::Decode(_))
    ));
  }

  #[test]
  fn decode_keeps_order() {
    let predictions = decode_predictions(
      r#"{"status": "ok", "predictions": [
        {"label": "b", "probability": 0.7, "detection_box": [0, 0, 1, 1]},
        {"label": "a", "probability": 0.9, "detection_box": [0, 0, 1, 1]}
      ]}"#,
    )
    .unwrap();
    let labels: Vec<_> = predictions.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, ["b", "a"]);
  }
}
