// Auth
pub const AUTHORIZATION: &str = "Authorization";
pub const MESSAGE_INVALID_TOKEN: &str = "Invalid token, please login again";
pub const EMPTY: &str = "";
pub const ONE_WEEK: usize = 60 * 60 * 24 * 7;

pub const IGNORE_ROUTES: [&str; 3] = ["/auth/sign-up", "/auth/verification", "/auth/sign-in"];

// OTP
pub const OTP_LENGTH: usize = 6;
pub const OTP_EXPIRY_MS: i64 = 30 * 60 * 1000;

// Wallet accounts
pub const ACCOUNT_NUMBER_PREFIX: &str = "88";
pub const ACCOUNT_NUMBER_RANDOM_DIGITS: usize = 8;
pub const ACCOUNT_NUMBER_MAX_ATTEMPTS: u32 = 16;
pub const ACCOUNT_NUMBER_BACKOFF_START_MS: u64 = 1;
pub const ACCOUNT_NUMBER_BACKOFF_CAP_MS: u64 = 64;

// Passwords
pub const PASSWORD_COST: u32 = 10;

pub const DEFAULT_PER_PAGE: i64 = 20;

// Money: at most two decimal places and fifteen integer digits
pub const MONEY_SCALE: i64 = 2;
pub const MONEY_MAX_INTEGER_DIGITS: i64 = 15;
