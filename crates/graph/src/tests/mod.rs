mod fakes;
mod routing;
