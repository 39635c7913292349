//! The built-in system preamble.
//!
//! A compact rendition of the declarations every shader sees: stage
//! variables and the commonly used builtin functions, declared as ordinary
//! GLSL so the regular pipeline types and registers them. Hosts that want a
//! richer standard library supply their own text through the user preamble
//! or disable this one with `no_stdlib`.

pub(crate) const SYSTEM_PREAMBLE: &str = r#"
vec4 gl_Position;
float gl_PointSize;
vec4 gl_FragCoord;
bool gl_FrontFacing;
vec4 gl_FragColor;
float gl_FragDepth;
int gl_VertexID;
int gl_InstanceID;
uvec3 gl_GlobalInvocationID;
uvec3 gl_LocalInvocationID;
uvec3 gl_WorkGroupID;

float radians(float degrees);
float degrees(float radians);
float sin(float angle);
float cos(float angle);
float tan(float angle);
float asin(float x);
float acos(float x);
float atan(float y, float x);
float atan(float y_over_x);

float pow(float x, float y);
float exp(float x);
float log(float x);
float exp2(float x);
float log2(float x);
float sqrt(float x);
float inversesqrt(float x);

int abs(int x);
float abs(float x);
float sign(float x);
float floor(float x);
float ceil(float x);
float fract(float x);
float mod(float x, float y);
int min(int x, int y);
uint min(uint x, uint y);
float min(float x, float y);
int max(int x, int y);
uint max(uint x, uint y);
float max(float x, float y);
int clamp(int x, int minVal, int maxVal);
float clamp(float x, float minVal, float maxVal);
float mix(float x, float y, float a);
float step(float edge, float x);
float smoothstep(float edge0, float edge1, float x);

float length(vec2 x);
float length(vec3 x);
float length(vec4 x);
float distance(vec3 p0, vec3 p1);
float dot(vec2 x, vec2 y);
float dot(vec3 x, vec3 y);
float dot(vec4 x, vec4 y);
vec3 cross(vec3 x, vec3 y);
vec2 normalize(vec2 x);
vec3 normalize(vec3 x);
vec4 normalize(vec4 x);
vec3 reflect(vec3 I, vec3 N);
vec3 refract(vec3 I, vec3 N, float eta);

vec4 texture(sampler2D sampler, vec2 P);
vec4 texture(samplerCube sampler, vec3 P);
vec4 texelFetch(sampler2D sampler, ivec2 P, int lod);

float dFdx(float p);
float dFdy(float p);
float fwidth(float p);
"#;
