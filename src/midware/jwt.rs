use crate::{
	constants::{AUTHORIZATION, EMPTY, IGNORE_ROUTES, MESSAGE_INVALID_TOKEN},
	error::AppError,
};
use actix_service::forward_ready;
use actix_web::{
	body::EitherBody,
	dev::{Service, ServiceRequest, ServiceResponse, Transform},
	http::Method,
	Error as AxError, HttpMessage, HttpResponse,
};
use chrono::Utc;
use futures::future::{ok, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, encode, errors::Error, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
	pub iat: usize,
	pub exp: usize,
	pub sub: String,
	pub email: String,
}

impl Claims {
	pub fn user_id(&self) -> Result<i32, AppError> {
		self.sub.parse::<i32>().map_err(|_| AppError::unauthorized("Invalid Token Provided"))
	}
}

#[derive(Serialize, Deserialize)]
pub struct ResponseBody {
	message: String,
	data: String,
}

impl ResponseBody {
	fn new(m: &str, d: &str) -> Self {
		Self { message: String::from(m), data: String::from(d) }
	}
}

#[derive(Clone)]
pub struct JWT {
	secret: String,
	expiration_secs: usize,
}

impl JWT {
	pub fn new(s: &str, expiration_secs: usize) -> Self {
		Self { secret: s.to_string(), expiration_secs }
	}

	pub fn create_jwt(&self, user_id: i32, email: &str) -> Result<String, Error> {
		let now = Utc::now().timestamp().max(0) as usize;
		let claims = Claims {
			iat: now,
			exp: now + self.expiration_secs,
			sub: user_id.to_string(),
			email: email.to_string(),
		};
		debug!("Creating token for user {}", user_id);
		encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_ref()))
	}

	pub fn verify_jwt(&self, token: &str) -> Result<Claims, Error> {
		decode::<Claims>(
			token,
			&DecodingKey::from_secret(self.secret.as_ref()),
			&Validation::default(),
		)
		.map(|data| data.claims)
	}
}

fn bearer_token(header: &str) -> Option<&str> {
	let scheme = header.get(..6)?;
	if scheme.eq_ignore_ascii_case("bearer") {
		Some(header[6..].trim()).filter(|t| !t.is_empty())
	} else {
		None
	}
}

pub struct Authentication {
	jwt: JWT,
}

impl Authentication {
	pub fn new(jwt: JWT) -> Self {
		Self { jwt }
	}
}

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
	S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = AxError>,
	S::Future: 'static,
	B: 'static,
{
	type Response = ServiceResponse<EitherBody<B>>;
	type Error = AxError;
	type InitError = ();
	type Transform = AuthenticationMiddleware<S>;
	type Future = Ready<Result<Self::Transform, Self::InitError>>;

	fn new_transform(&self, service: S) -> Self::Future {
		ok(AuthenticationMiddleware { jwt: self.jwt.clone(), service })
	}
}

pub struct AuthenticationMiddleware<S> {
	jwt: JWT,
	service: S,
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
	S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = AxError>,
	S::Future: 'static,
	B: 'static,
{
	type Response = ServiceResponse<EitherBody<B>>;
	type Error = AxError;
	type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

	forward_ready!(service);

	fn call(&self, req: ServiceRequest) -> Self::Future {
		debug!("## Req: {}", req.path());

		// Bypass the public account routes
		let mut authenticate_pass = Method::OPTIONS == *req.method() ||
			IGNORE_ROUTES.iter().any(|route| req.path().starts_with(route));

		if !authenticate_pass {
			let token = req
				.headers()
				.get(AUTHORIZATION)
				.and_then(|h| h.to_str().ok())
				.and_then(bearer_token);
			if let Some(token) = token {
				match self.jwt.verify_jwt(token) {
					Ok(claims) => {
						req.extensions_mut().insert(claims);
						authenticate_pass = true;
					},
					Err(e) => warn!("Invalid token: {:?}", e),
				}
			}
		}

		if !authenticate_pass {
			let (request, _pl) = req.into_parts();
			let response = HttpResponse::Unauthorized()
				.json(ResponseBody::new(MESSAGE_INVALID_TOKEN, EMPTY))
				.map_into_right_body();

			return Box::pin(async { Ok(ServiceResponse::new(request, response)) });
		}

		let res = self.service.call(req);

		Box::pin(async move { res.await.map(ServiceResponse::map_into_left_body) })
	}
}
