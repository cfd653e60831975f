pub mod cbe;
pub mod index;
pub mod telebirr;
