mod construction;
mod stream;
mod unary;
