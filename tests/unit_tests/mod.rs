mod algebra;
mod algorithms;
mod derivative;
mod expr;
mod form;
mod formoperators;
mod indexed;
mod repr;
